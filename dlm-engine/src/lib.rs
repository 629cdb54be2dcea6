//! dlm fragment activation engine
//!
//! Turns configured fragment definitions into cached, namespaced user views
//! that a later merge stage can combine into per-user layouts.
//!
//! # Architecture
//!
//! ```text
//! FragmentActivator ── ensure_activated ──▶ sweep every fragment once
//!        │
//!        └── user_view ──▶ FragmentViewCache ── miss ──▶ ActivationPipeline
//!                                                         │
//!                         OwnerBinder ◀───────────────────┤
//!                         LayoutLoader ◀──────────────────┤
//!                         sanitize / namespace ◀──────────┘
//! ```
//!
//! Activation runs at most once at a time per owner. Activations of
//! different owners run in parallel, and cached views are served without
//! blocking each other. Failures are confined to the fragment that caused
//! them and are retried on the next request.
//!
//! Identity, persistence and configuration are reached through the traits in
//! [`store`].

pub mod activator;
pub mod binder;
pub mod cache;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod store;
pub mod view;

pub use activator::{FragmentActivator, SweepStatus};
pub use binder::OwnerBinder;
pub use cache::FragmentViewCache;
pub use error::{ActivationError, StoreError};
pub use loader::{LayoutLoader, RawLayout, RawPreferences};
pub use metrics::{ActivationMetrics, MetricsSnapshot};
pub use pipeline::ActivationPipeline;
pub use store::{ConfigSource, IdentityStore, LayoutStore, Owner};
pub use view::UserView;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::activator::{FragmentActivator, SweepStatus};
    pub use crate::error::{ActivationError, StoreError};
    pub use crate::store::{ConfigSource, IdentityStore, LayoutStore, Owner};
    pub use crate::view::UserView;
    pub use dlm_layout::LayoutDocument;
    pub use dlm_types::{FragmentDefinition, OwnerId, Person, PreferenceSet, UserId, UserProfile};
}
