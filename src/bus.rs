//! In-process change signals.
//!
//! Each collection owns exactly one signal. Every successful write persists
//! the full collection and then emits that signal; subscribers respond by
//! calling the collection's `list()` again and replacing their view
//! wholesale. There is no payload, no diffing, and no cross-process
//! propagation.
//!
//! Ordering: a writer's own subsequent read always sees its own write
//! because the storage write is synchronous. Cross-writer ordering is
//! last-write-wins at full-collection granularity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// One broadcast signal per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    ReportsChanged,
    NotificationsChanged,
    ProspectBooksChanged,
    TemplatesChanged,
    WatchlistChanged,
    WatchlistAlertsChanged,
    ActivityChanged,
    ProductGapsChanged,
}

type Handler = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by `subscribe`; pass back to `unsubscribe` to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    signal: Signal,
    token: u64,
}

/// Same-process fan-out bus for collection change signals.
///
/// Handlers are stored as `Arc<dyn Fn()>` so `emit` can clone the current
/// list and invoke handlers outside the lock; a handler may therefore
/// subscribe or unsubscribe without deadlocking.
#[derive(Default)]
pub struct SignalBus {
    next_token: AtomicU64,
    handlers: RwLock<HashMap<Signal, Vec<(u64, Handler)>>>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every future emission of `signal`.
    pub fn subscribe(&self, signal: Signal, handler: impl Fn() + Send + Sync + 'static) -> Subscription {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .write()
            .entry(signal)
            .or_default()
            .push((token, Arc::new(handler)));
        Subscription { signal, token }
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        if let Some(list) = self.handlers.write().get_mut(&subscription.signal) {
            list.retain(|(token, _)| *token != subscription.token);
        }
    }

    /// Fan `signal` out to every current subscriber, in subscription order.
    pub fn emit(&self, signal: Signal) {
        let snapshot: Vec<Handler> = self
            .handlers
            .read()
            .get(&signal)
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();
        for handler in snapshot {
            handler();
        }
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self, signal: Signal) -> usize {
        self.handlers
            .read()
            .get(&signal)
            .map(Vec::len)
            .unwrap_or(0)
    }
}
