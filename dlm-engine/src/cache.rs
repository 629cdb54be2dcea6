//! Per-owner view cache with get-or-activate
//!
//! Views are keyed by owner id. Each owner has its own read/write lock:
//! cache hits take it shared, the populate path takes it exclusive, so at
//! most one activation per owner runs at a time while different owners
//! activate in parallel. A failed activation publishes nothing and the next
//! request tries again.

use crate::metrics::ActivationMetrics;
use crate::view::UserView;
use dashmap::DashMap;
use dlm_types::OwnerId;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Default)]
pub struct FragmentViewCache {
    views: DashMap<OwnerId, Arc<UserView>>,

    /// Created on first use and never removed
    locks: DashMap<OwnerId, Arc<RwLock<()>>>,

    metrics: ActivationMetrics,
}

impl FragmentViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct lookup, without locking or activation
    pub fn get(&self, owner: &OwnerId) -> Option<Arc<UserView>> {
        self.views.get(owner).map(|entry| Arc::clone(entry.value()))
    }

    pub fn has(&self, owner: &OwnerId) -> bool {
        self.views.contains_key(owner)
    }

    /// Publish a view, replacing any previous one for the owner
    ///
    /// # Panics
    ///
    /// Panics if `owner` is empty.
    pub fn put(&self, owner: OwnerId, view: UserView) -> Arc<UserView> {
        assert!(!owner.as_str().is_empty(), "view published without an owner id");
        let view = Arc::new(view);
        self.views.insert(owner, Arc::clone(&view));
        view
    }

    /// The lock guarding activation for `owner`
    ///
    /// Concurrent first calls for the same owner all receive the same lock.
    pub fn owner_lock(&self, owner: &OwnerId) -> Arc<RwLock<()>> {
        if let Some(lock) = self.locks.get(owner) {
            return Arc::clone(lock.value());
        }
        let entry = self.locks.entry(owner.clone()).or_default();
        Arc::clone(entry.value())
    }

    /// Return the cached view for `owner`, activating it on a miss
    ///
    /// `activate` runs under the owner's exclusive lock, and only if no view
    /// was published while waiting for it. Its error is handed back as is.
    pub fn get_or_activate<E>(
        &self,
        owner: &OwnerId,
        activate: impl FnOnce() -> Result<UserView, E>,
    ) -> Result<Arc<UserView>, E> {
        let lock = self.owner_lock(owner);

        {
            let _shared = lock.read();
            if let Some(view) = self.get(owner) {
                self.metrics.record_hit();
                return Ok(view);
            }
        }
        self.metrics.record_miss();

        let _exclusive = lock.write();
        if let Some(view) = self.get(owner) {
            trace!(%owner, "view published while waiting for lock");
            return Ok(view);
        }

        let view = activate()?;
        Ok(self.put(owner.clone(), view))
    }

    /// Activate `owner` unconditionally under its exclusive lock and publish
    /// the result
    ///
    /// Used by the startup sweep, which must not leave a stale view in place.
    pub fn activate_exclusive<E>(
        &self,
        owner: &OwnerId,
        activate: impl FnOnce() -> Result<UserView, E>,
    ) -> Result<Arc<UserView>, E> {
        let lock = self.owner_lock(owner);
        let _exclusive = lock.write();
        let view = activate()?;
        Ok(self.put(owner.clone(), view))
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn metrics(&self) -> &ActivationMetrics {
        &self.metrics
    }
}
