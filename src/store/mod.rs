//! Local object store: namespaced collection CRUD with broadcast-on-write.
//!
//! One generic pattern, instantiated once per collection in
//! [`collections`]. Every mutating operation re-reads the collection from
//! storage, writes the entire collection back (no partial or delta writes),
//! and then emits that collection's signal. Reads always re-deserialize
//! rather than trusting an in-memory cache, so independent call sites never
//! observe each other's stale state.
//!
//! Failure semantics: a corrupt stored blob reads as an empty collection
//! and the corrupt entry is evicted; a missing id on update/remove is a
//! logged sentinel `None`, never an error.
//!
//! Prospect books deviate from the id-keyed contract by using the
//! normalized prospect name as the natural key; see [`prospects`].

pub mod backend;
pub mod collections;
pub mod prospects;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::bus::{Signal, SignalBus};
use crate::error::CoreError;

pub use backend::{FileStorage, MemoryStorage, StorageBackend};
pub use collections::Stores;
pub use prospects::ProspectBookStore;

/// An id-keyed record that can live in a [`Collection`].
pub trait Entity: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> &str;
}

/// One named, independently persisted collection of same-type entities.
pub struct Collection<T: Entity> {
    key: &'static str,
    signal: Signal,
    storage: Arc<dyn StorageBackend>,
    bus: Arc<SignalBus>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Collection<T> {
    pub fn new(
        key: &'static str,
        signal: Signal,
        storage: Arc<dyn StorageBackend>,
        bus: Arc<SignalBus>,
    ) -> Self {
        Collection {
            key,
            signal,
            storage,
            bus,
            _entity: PhantomData,
        }
    }

    /// Read the whole collection from storage.
    ///
    /// A blob that fails to deserialize is treated as an empty collection
    /// and evicted so the next write starts clean.
    pub fn list(&self) -> Vec<T> {
        match self.storage.get(self.key) {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(items) => items,
                Err(e) => {
                    log::warn!("Discarding corrupt collection '{}': {}", self.key, e);
                    self.storage.remove(self.key);
                    Vec::new()
                }
            },
        }
    }

    pub fn find(&self, id: &str) -> Option<T> {
        self.list().into_iter().find(|item| item.id() == id)
    }

    /// Prepend `item` so the collection stays newest-first, then persist
    /// and broadcast.
    pub fn insert(&self, item: T) -> Result<T, CoreError> {
        let mut items = self.list();
        items.insert(0, item.clone());
        self.persist(&items)?;
        Ok(item)
    }

    /// Apply `mutate` to the entity with `id`. Returns the updated entity,
    /// or `None` (logged) when the id is gone.
    pub fn update(
        &self,
        id: &str,
        mutate: impl FnOnce(&mut T),
    ) -> Result<Option<T>, CoreError> {
        let mut items = self.list();
        let Some(item) = items.iter_mut().find(|item| item.id() == id) else {
            log::warn!("Update on '{}' missed id {}", self.key, id);
            return Ok(None);
        };
        mutate(item);
        let updated = item.clone();
        self.persist(&items)?;
        Ok(Some(updated))
    }

    /// Apply `mutate` to every entity in the collection, persisting once.
    pub fn update_all(&self, mut mutate: impl FnMut(&mut T)) -> Result<Vec<T>, CoreError> {
        let mut items = self.list();
        for item in items.iter_mut() {
            mutate(item);
        }
        self.persist(&items)?;
        Ok(items)
    }

    /// Remove the entity with `id`. Returns the remaining collection, or
    /// `None` (logged, nothing written) when the id is gone.
    pub fn remove(&self, id: &str) -> Result<Option<Vec<T>>, CoreError> {
        let mut items = self.list();
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() == before {
            log::warn!("Remove on '{}' missed id {}", self.key, id);
            return Ok(None);
        }
        self.persist(&items)?;
        Ok(Some(items))
    }

    fn persist(&self, items: &[T]) -> Result<(), CoreError> {
        let raw = serde_json::to_string(items)
            .map_err(|e| CoreError::Storage(format!("serialize '{}': {}", self.key, e)))?;
        self.storage.set(self.key, &raw)?;
        self.bus.emit(self.signal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: String,
        label: String,
    }

    impl Entity for Widget {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn fixture() -> (Collection<Widget>, Arc<dyn StorageBackend>, Arc<SignalBus>) {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let bus = Arc::new(SignalBus::new());
        let collection = Collection::new(
            "test.widgets",
            Signal::TemplatesChanged,
            Arc::clone(&storage),
            Arc::clone(&bus),
        );
        (collection, storage, bus)
    }

    fn widget(id: &str, label: &str) -> Widget {
        Widget {
            id: id.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_insert_then_list_round_trips() {
        let (collection, _, _) = fixture();
        collection.insert(widget("w1", "first")).expect("insert");

        let items = collection.list();
        assert_eq!(items, vec![widget("w1", "first")]);
    }

    #[test]
    fn test_two_inserts_newest_first() {
        let (collection, _, _) = fixture();
        collection.insert(widget("w1", "first")).expect("insert");
        collection.insert(widget("w2", "second")).expect("insert");

        let ids: Vec<String> = collection.list().into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["w2".to_string(), "w1".to_string()]);
    }

    #[test]
    fn test_update_touches_only_target_field() {
        let (collection, _, _) = fixture();
        collection.insert(widget("w1", "first")).expect("insert");
        collection.insert(widget("w2", "second")).expect("insert");

        let updated = collection
            .update("w1", |w| w.label = "renamed".to_string())
            .expect("update")
            .expect("found");
        assert_eq!(updated.label, "renamed");

        let items = collection.list();
        assert_eq!(items[0], widget("w2", "second"));
        assert_eq!(items[1], widget("w1", "renamed"));
    }

    #[test]
    fn test_update_missing_id_is_sentinel_none() {
        let (collection, _, _) = fixture();
        let result = collection.update("ghost", |_| {}).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn test_remove_drops_entity() {
        let (collection, _, _) = fixture();
        collection.insert(widget("w1", "first")).expect("insert");
        collection.insert(widget("w2", "second")).expect("insert");

        let remaining = collection.remove("w1").expect("no error").expect("found");
        assert_eq!(remaining, vec![widget("w2", "second")]);
        assert!(collection.find("w1").is_none());
    }

    #[test]
    fn test_remove_missing_id_writes_nothing() {
        let (collection, _, bus) = fixture();
        collection.insert(widget("w1", "first")).expect("insert");

        let emissions = Arc::new(AtomicUsize::new(0));
        let emissions_clone = Arc::clone(&emissions);
        bus.subscribe(Signal::TemplatesChanged, move || {
            emissions_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(collection.remove("ghost").expect("no error").is_none());
        assert_eq!(emissions.load(Ordering::SeqCst), 0);
        assert_eq!(collection.list().len(), 1);
    }

    #[test]
    fn test_every_write_broadcasts() {
        let (collection, _, bus) = fixture();
        let emissions = Arc::new(AtomicUsize::new(0));
        let emissions_clone = Arc::clone(&emissions);
        bus.subscribe(Signal::TemplatesChanged, move || {
            emissions_clone.fetch_add(1, Ordering::SeqCst);
        });

        collection.insert(widget("w1", "first")).expect("insert");
        collection.update("w1", |w| w.label = "x".to_string()).expect("update");
        collection.remove("w1").expect("remove");

        assert_eq!(emissions.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_subscriber_rereads_and_sees_writer_state() {
        // The synchronization protocol: on signal, re-list wholesale.
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let bus = Arc::new(SignalBus::new());
        let writer = Arc::new(Collection::<Widget>::new(
            "test.widgets",
            Signal::TemplatesChanged,
            Arc::clone(&storage),
            Arc::clone(&bus),
        ));

        let reader = Arc::new(Collection::<Widget>::new(
            "test.widgets",
            Signal::TemplatesChanged,
            Arc::clone(&storage),
            Arc::clone(&bus),
        ));
        let observed = Arc::new(parking_lot::Mutex::new(Vec::<usize>::new()));
        let observed_clone = Arc::clone(&observed);
        let reader_clone = Arc::clone(&reader);
        bus.subscribe(Signal::TemplatesChanged, move || {
            observed_clone.lock().push(reader_clone.list().len());
        });

        writer.insert(widget("w1", "first")).expect("insert");
        writer.insert(widget("w2", "second")).expect("insert");

        assert_eq!(*observed.lock(), vec![1, 2]);
    }

    #[test]
    fn test_corrupt_blob_reads_empty_and_is_evicted() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (collection, storage, _) = fixture();
        storage.set("test.widgets", "{not json").expect("seed corrupt");

        assert!(collection.list().is_empty());
        // evicted on that read, not retried
        assert!(storage.get("test.widgets").is_none());
    }

    #[test]
    fn test_writers_that_reread_before_writing_do_not_clobber() {
        // Two stores over the same key: each insert re-reads the full
        // collection before persisting, so sequential writers compose.
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let bus = Arc::new(SignalBus::new());
        let a = Collection::<Widget>::new(
            "test.widgets",
            Signal::TemplatesChanged,
            Arc::clone(&storage),
            Arc::clone(&bus),
        );
        let b = Collection::<Widget>::new(
            "test.widgets",
            Signal::TemplatesChanged,
            Arc::clone(&storage),
            Arc::clone(&bus),
        );

        a.insert(widget("w1", "from a")).expect("insert");
        b.insert(widget("w2", "from b")).expect("insert");

        let ids: Vec<String> = a.list().iter().map(|w| w.id.clone()).collect();
        assert_eq!(ids, vec!["w2".to_string(), "w1".to_string()]);
    }

    #[test]
    fn test_stale_snapshot_write_loses_concurrent_insert() {
        // The lost-update race inherent in whole-collection writes: a
        // writer that persists a snapshot taken before another writer's
        // insert silently drops that insert. Accepted limitation,
        // exercised here rather than solved.
        let (collection, storage, _) = fixture();

        collection.insert(widget("w1", "from a")).expect("insert");
        let stale = storage.get("test.widgets").expect("snapshot");

        collection.insert(widget("w2", "from b")).expect("insert");
        assert_eq!(collection.list().len(), 2);

        // A slow writer flushing its pre-w2 snapshot wins the key.
        storage.set("test.widgets", &stale).expect("stale flush");

        let ids: Vec<String> = collection.list().iter().map(|w| w.id.clone()).collect();
        assert_eq!(ids, vec!["w1".to_string()]);
        assert!(collection.find("w2").is_none());
    }
}
