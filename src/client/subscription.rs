//! Long-lived listener registrations tied to a view's lifetime.
//!
//! A [`Subscription`] stays registered for as long as the guard is alive.
//! Views keep the guard in a field, so replacing or dropping it detaches
//! the listener and a navigation can never leave one behind.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    /// Viewport intersection tracking for headings.
    IntersectionObserver,
    /// Global keyboard listener.
    KeyboardShortcut,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: HashMap<u64, (SubscriptionKind, String)>,
}

/// Shared table of live subscriptions.
#[derive(Debug, Clone, Default)]
pub struct Subscriptions {
    registry: Arc<Mutex<Registry>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener owned by `owner`.
    pub fn subscribe(&self, kind: SubscriptionKind, owner: impl Into<String>) -> Subscription {
        let owner = owner.into();
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        tracing::trace!("Attached {:?} #{} for {}", kind, id, owner);
        registry.active.insert(id, (kind, owner));

        Subscription {
            id,
            kind,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Number of live subscriptions of `kind`.
    pub fn active(&self, kind: SubscriptionKind) -> usize {
        self.lock().active.values().filter(|(k, _)| *k == kind).count()
    }

    /// Owners of live subscriptions of `kind`, sorted.
    pub fn owners(&self, kind: SubscriptionKind) -> Vec<String> {
        let mut owners: Vec<String> = self
            .lock()
            .active
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, owner)| owner.clone())
            .collect();
        owners.sort();
        owners
    }

    pub fn total(&self) -> usize {
        self.lock().active.len()
    }
}

/// Guard for one registration. Dropping it detaches the listener.
pub struct Subscription {
    id: u64,
    kind: SubscriptionKind,
    registry: Arc<Mutex<Registry>>,
}

impl Subscription {
    pub fn kind(&self) -> SubscriptionKind {
        self.kind
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.active.remove(&self.id);
        tracing::trace!("Detached {:?} #{}", self.kind, self.id);
    }
}
