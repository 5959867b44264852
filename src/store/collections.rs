//! The concrete collection stores.
//!
//! Each store is a thin typed wrapper over [`Collection`]: it owns the
//! storage key and signal for its collection, assigns prefixed ids and
//! creation timestamps, and exposes only the operations its entity
//! supports (notifications cannot be removed, the activity log is
//! insert-only).

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::bus::{Signal, SignalBus};
use crate::error::CoreError;
use crate::types::{
    ActivityDetails, ActivityEvent, ActivityKind, Notification, NotificationKind, ProductGap,
    ReportData, ReportTemplate, SavedReport, WatchlistAlert, WatchlistItem,
};

use super::{Collection, Entity, ProspectBookStore, StorageBackend};

pub(crate) fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

// =============================================================================
// Entity impls
// =============================================================================

impl Entity for SavedReport {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Notification {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for ActivityEvent {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for ReportTemplate {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for ProductGap {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for WatchlistItem {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for WatchlistAlert {
    fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Reports
// =============================================================================

pub struct ReportStore {
    inner: Collection<SavedReport>,
}

impl ReportStore {
    fn new(storage: Arc<dyn StorageBackend>, bus: Arc<SignalBus>) -> Self {
        ReportStore {
            inner: Collection::new("pd.reports", Signal::ReportsChanged, storage, bus),
        }
    }

    pub fn list(&self) -> Vec<SavedReport> {
        self.inner.list()
    }

    pub fn get(&self, id: &str) -> Option<SavedReport> {
        self.inner.find(id)
    }

    pub fn find_by_title(&self, title: &str) -> Option<SavedReport> {
        self.inner
            .list()
            .into_iter()
            .find(|r| r.data.title.eq_ignore_ascii_case(title))
    }

    /// Persist a newly assembled report. `id` and `saved_at` are assigned
    /// here, once.
    pub fn save(&self, data: ReportData) -> Result<SavedReport, CoreError> {
        self.inner.insert(SavedReport {
            id: new_id("rep"),
            saved_at: now_rfc3339(),
            data,
        })
    }

    /// Mutate a report's payload in place. Identity fields stay untouched.
    pub fn update_data(
        &self,
        id: &str,
        mutate: impl FnOnce(&mut ReportData),
    ) -> Result<Option<SavedReport>, CoreError> {
        self.inner.update(id, |report| mutate(&mut report.data))
    }

    pub fn remove(&self, id: &str) -> Result<Option<Vec<SavedReport>>, CoreError> {
        self.inner.remove(id)
    }
}

// =============================================================================
// Notifications
// =============================================================================

pub struct NotificationStore {
    inner: Collection<Notification>,
}

impl NotificationStore {
    fn new(storage: Arc<dyn StorageBackend>, bus: Arc<SignalBus>) -> Self {
        NotificationStore {
            inner: Collection::new(
                "pd.notifications",
                Signal::NotificationsChanged,
                storage,
                bus,
            ),
        }
    }

    pub fn list(&self) -> Vec<Notification> {
        self.inner.list()
    }

    pub fn unread_count(&self) -> usize {
        self.inner.list().iter().filter(|n| !n.is_read).count()
    }

    pub fn notify(
        &self,
        kind: NotificationKind,
        actor: &str,
        message: &str,
        link_to: &str,
    ) -> Result<Notification, CoreError> {
        self.inner.insert(Notification {
            id: new_id("ntf"),
            kind,
            actor: actor.to_string(),
            message: message.to_string(),
            link_to: link_to.to_string(),
            is_read: false,
            created_at: now_rfc3339(),
        })
    }

    pub fn mark_read(&self, id: &str) -> Result<Option<Notification>, CoreError> {
        self.inner.update(id, |n| n.is_read = true)
    }

    pub fn mark_all_read(&self) -> Result<(), CoreError> {
        self.inner.update_all(|n| n.is_read = true)?;
        Ok(())
    }
}

// =============================================================================
// Activity log
// =============================================================================

/// Strictly insert-only; newest-first by prepending.
pub struct ActivityLog {
    inner: Collection<ActivityEvent>,
}

impl ActivityLog {
    fn new(storage: Arc<dyn StorageBackend>, bus: Arc<SignalBus>) -> Self {
        ActivityLog {
            inner: Collection::new("pd.activity", Signal::ActivityChanged, storage, bus),
        }
    }

    pub fn list(&self) -> Vec<ActivityEvent> {
        self.inner.list()
    }

    pub fn record(
        &self,
        kind: ActivityKind,
        module: &str,
        primary: &str,
        secondary: Option<&str>,
    ) -> Result<ActivityEvent, CoreError> {
        self.inner.insert(ActivityEvent {
            id: new_id("act"),
            timestamp: now_rfc3339(),
            kind,
            module: module.to_string(),
            details: ActivityDetails {
                primary: primary.to_string(),
                secondary: secondary.map(str::to_string),
            },
        })
    }
}

// =============================================================================
// Templates
// =============================================================================

pub struct TemplateStore {
    inner: Collection<ReportTemplate>,
}

impl TemplateStore {
    fn new(storage: Arc<dyn StorageBackend>, bus: Arc<SignalBus>) -> Self {
        TemplateStore {
            inner: Collection::new("pd.templates", Signal::TemplatesChanged, storage, bus),
        }
    }

    pub fn list(&self) -> Vec<ReportTemplate> {
        self.inner.list()
    }

    pub fn add(&self, name: &str, prompt: &str) -> Result<ReportTemplate, CoreError> {
        self.inner.insert(ReportTemplate {
            id: new_id("tpl"),
            name: name.to_string(),
            prompt: prompt.to_string(),
            created_at: now_rfc3339(),
        })
    }

    pub fn update(
        &self,
        id: &str,
        mutate: impl FnOnce(&mut ReportTemplate),
    ) -> Result<Option<ReportTemplate>, CoreError> {
        self.inner.update(id, mutate)
    }

    pub fn remove(&self, id: &str) -> Result<Option<Vec<ReportTemplate>>, CoreError> {
        self.inner.remove(id)
    }
}

// =============================================================================
// Product gaps
// =============================================================================

pub struct ProductGapStore {
    inner: Collection<ProductGap>,
}

impl ProductGapStore {
    fn new(storage: Arc<dyn StorageBackend>, bus: Arc<SignalBus>) -> Self {
        ProductGapStore {
            inner: Collection::new("pd.product_gaps", Signal::ProductGapsChanged, storage, bus),
        }
    }

    pub fn list(&self) -> Vec<ProductGap> {
        self.inner.list()
    }

    pub fn add(&self, prospect: &str, description: &str) -> Result<ProductGap, CoreError> {
        self.inner.insert(ProductGap {
            id: new_id("gap"),
            prospect: prospect.to_string(),
            description: description.to_string(),
            created_at: now_rfc3339(),
        })
    }

    pub fn remove(&self, id: &str) -> Result<Option<Vec<ProductGap>>, CoreError> {
        self.inner.remove(id)
    }
}

// =============================================================================
// Watchlist (items + alerts, two collections)
// =============================================================================

pub struct WatchlistStore {
    items: Collection<WatchlistItem>,
    alerts: Collection<WatchlistAlert>,
}

impl WatchlistStore {
    fn new(storage: Arc<dyn StorageBackend>, bus: Arc<SignalBus>) -> Self {
        WatchlistStore {
            items: Collection::new(
                "pd.watchlist",
                Signal::WatchlistChanged,
                Arc::clone(&storage),
                Arc::clone(&bus),
            ),
            alerts: Collection::new(
                "pd.watchlist_alerts",
                Signal::WatchlistAlertsChanged,
                storage,
                bus,
            ),
        }
    }

    pub fn items(&self) -> Vec<WatchlistItem> {
        self.items.list()
    }

    pub fn add_item(&self, name: &str, criteria: Option<&str>) -> Result<WatchlistItem, CoreError> {
        self.items.insert(WatchlistItem {
            id: new_id("wli"),
            name: name.to_string(),
            criteria: criteria.map(str::to_string),
            created_at: now_rfc3339(),
        })
    }

    pub fn remove_item(&self, id: &str) -> Result<Option<Vec<WatchlistItem>>, CoreError> {
        self.items.remove(id)
    }

    pub fn alerts(&self) -> Vec<WatchlistAlert> {
        self.alerts.list()
    }

    pub fn add_alert(
        &self,
        item_name: &str,
        headline: &str,
        summary: Option<&str>,
    ) -> Result<WatchlistAlert, CoreError> {
        self.alerts.insert(WatchlistAlert {
            id: new_id("wla"),
            item_name: item_name.to_string(),
            headline: headline.to_string(),
            summary: summary.map(str::to_string),
            created_at: now_rfc3339(),
        })
    }
}

// =============================================================================
// Aggregate
// =============================================================================

/// Every collection store, constructed once per session over one storage
/// backend and one signal bus, then passed explicitly to whatever needs it.
pub struct Stores {
    pub reports: ReportStore,
    pub notifications: NotificationStore,
    pub books: ProspectBookStore,
    pub activity: ActivityLog,
    pub templates: TemplateStore,
    pub gaps: ProductGapStore,
    pub watchlist: WatchlistStore,
}

impl Stores {
    pub fn new(storage: Arc<dyn StorageBackend>, bus: Arc<SignalBus>) -> Self {
        Stores {
            reports: ReportStore::new(Arc::clone(&storage), Arc::clone(&bus)),
            notifications: NotificationStore::new(Arc::clone(&storage), Arc::clone(&bus)),
            books: ProspectBookStore::new(Arc::clone(&storage), Arc::clone(&bus)),
            activity: ActivityLog::new(Arc::clone(&storage), Arc::clone(&bus)),
            templates: TemplateStore::new(Arc::clone(&storage), Arc::clone(&bus)),
            gaps: ProductGapStore::new(Arc::clone(&storage), Arc::clone(&bus)),
            watchlist: WatchlistStore::new(storage, bus),
        }
    }
}
