//! Fragment activation: the startup sweep and the lazy per-owner path.

use crate::cache::FragmentViewCache;
use crate::error::ActivationError;
use crate::metrics::MetricsSnapshot;
use crate::pipeline::ActivationPipeline;
use crate::store::{ConfigSource, IdentityStore, LayoutStore};
use crate::view::UserView;
use dlm_types::audience::Person;
use dlm_types::{FragmentDefinition, OwnerId};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of the startup sweep for one fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStatus {
    /// A view was published
    Available,

    /// The fragment has no audience and was not activated
    Skipped,

    /// Activation failed; the fragment contributes nothing
    Unavailable,
}

/// Owns the view cache and decides when fragments get activated
///
/// [`ensure_activated`](Self::ensure_activated) activates every configured
/// fragment once per activator. Fragments that failed then, or were never
/// part of the sweep, are activated on first request instead.
pub struct FragmentActivator {
    config: Arc<dyn ConfigSource>,
    pipeline: ActivationPipeline,
    cache: FragmentViewCache,
    swept: OnceCell<()>,
}

impl FragmentActivator {
    pub fn new(
        config: Arc<dyn ConfigSource>,
        identity: Arc<dyn IdentityStore>,
        layouts: Arc<dyn LayoutStore>,
    ) -> Self {
        FragmentActivator {
            pipeline: ActivationPipeline::new(identity, layouts, Arc::clone(&config)),
            config,
            cache: FragmentViewCache::new(),
            swept: OnceCell::new(),
        }
    }

    /// Run the startup sweep unless it already ran
    ///
    /// Concurrent callers block until the first caller's sweep finishes.
    pub fn ensure_activated(&self) {
        if self.swept.get().is_some() {
            return;
        }
        self.swept.get_or_init(|| {
            self.sweep();
        });
    }

    pub fn is_activated(&self) -> bool {
        self.swept.get().is_some()
    }

    fn sweep(&self) -> Vec<(String, SweepStatus)> {
        let fragments = self.config.fragments();
        info!(
            properties = self.config.property_count(),
            fragments = fragments.len(),
            "activating fragments"
        );

        let statuses: Vec<_> = fragments
            .iter()
            .map(|fragment| (fragment.name.clone(), self.sweep_fragment(fragment)))
            .collect();

        let available = statuses
            .iter()
            .filter(|(_, status)| *status == SweepStatus::Available)
            .count();
        info!(
            available,
            total = statuses.len(),
            "fragment activation complete"
        );
        statuses
    }

    fn sweep_fragment(&self, fragment: &FragmentDefinition) -> SweepStatus {
        if fragment.is_no_audience_included() {
            debug!(fragment = %fragment.name, "no audience configured, skipping activation");
            return SweepStatus::Skipped;
        }

        match self
            .cache
            .activate_exclusive(&fragment.owner_id, || self.run_pipeline(fragment))
        {
            Ok(_) => SweepStatus::Available,
            Err(err) => {
                self.report_failure(fragment, &err);
                SweepStatus::Unavailable
            }
        }
    }

    /// Run the sweep now and report per-fragment outcomes
    ///
    /// Marks the activator as activated, so a later
    /// [`ensure_activated`](Self::ensure_activated) does nothing. Returns
    /// `None` if the sweep already ran.
    pub fn activate_all(&self) -> Option<Vec<(String, SweepStatus)>> {
        let mut statuses = None;
        self.swept.get_or_init(|| {
            statuses = Some(self.sweep());
        });
        statuses
    }

    /// The view of `fragment`, activating it if it is not cached yet
    ///
    /// Returns `None` when activation fails or the fragment has no audience.
    /// Failures are not remembered; the next call tries again.
    pub fn user_view(&self, fragment: &FragmentDefinition) -> Option<Arc<UserView>> {
        if fragment.is_no_audience_included() {
            debug!(fragment = %fragment.name, "no audience configured, not activating");
            return None;
        }

        self.cache
            .get_or_activate(&fragment.owner_id, || self.run_pipeline(fragment))
            .map_err(|err| self.report_failure(fragment, &err))
            .ok()
    }

    /// The cached view of `owner`, without activating anything
    pub fn cached_view(&self, owner: &OwnerId) -> Option<Arc<UserView>> {
        self.cache.get(owner)
    }

    pub fn has_user_view(&self, owner: &OwnerId) -> bool {
        self.cache.has(owner)
    }

    /// Publish a view for `owner`, replacing any cached one
    pub fn set_user_view(&self, owner: OwnerId, view: UserView) -> Arc<UserView> {
        self.cache.put(owner, view)
    }

    /// Look up a configured fragment by owner
    pub fn fragment(&self, owner: &OwnerId) -> Option<&FragmentDefinition> {
        self.config
            .fragments()
            .iter()
            .find(|fragment| &fragment.owner_id == owner)
    }

    /// Views of every fragment applying to `person`, in merge order
    ///
    /// Merge order is precedence descending, then configuration order.
    /// Fragments whose activation fails are left out.
    pub fn applicable_views(&self, person: &Person) -> Vec<Arc<UserView>> {
        self.ensure_activated();

        let mut fragments: Vec<_> = self
            .config
            .fragments()
            .iter()
            .filter(|fragment| fragment.applies_to(person))
            .collect();
        fragments.sort_by(|a, b| {
            b.precedence
                .total_cmp(&a.precedence)
                .then(a.index.cmp(&b.index))
        });

        fragments
            .into_iter()
            .filter_map(|fragment| self.user_view(fragment))
            .collect()
    }

    pub fn cache(&self) -> &FragmentViewCache {
        &self.cache
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.cache.metrics().snapshot()
    }

    fn run_pipeline(&self, fragment: &FragmentDefinition) -> Result<UserView, ActivationError> {
        let start = Instant::now();
        let result = self.pipeline.activate(fragment);
        self.cache
            .metrics()
            .record_activation(result.is_ok(), start.elapsed());

        if result.is_ok() {
            debug!(
                fragment = %fragment.name,
                owner = %fragment.owner_id,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "fragment activated"
            );
        }
        result
    }

    fn report_failure(&self, fragment: &FragmentDefinition, err: &ActivationError) {
        warn!(
            fragment = %fragment.name,
            owner = %fragment.owner_id,
            "fragment unavailable for inclusion in layouts: {}",
            err.report()
        );
        debug!(fragment = %fragment.name, error = ?err, "activation failure detail");
    }
}

impl std::fmt::Debug for FragmentActivator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentActivator")
            .field("activated", &self.is_activated())
            .field("views", &self.cache.len())
            .finish_non_exhaustive()
    }
}
