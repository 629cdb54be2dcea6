//! # dlm-core
//!
//! Configuration and storage for the dlm fragment engine.
//!
//! This crate reads `dlm.yml` into a [`DlmConfig`] and provides
//! [`MemoryStore`], a file-seeded identity and layout store. Together they
//! supply everything a [`FragmentActivator`] needs.

pub mod config;
pub mod store;

pub use config::{ConfigError, DlmConfig};
pub use store::MemoryStore;

use dlm_engine::FragmentActivator;
use std::sync::Arc;

/// Build an activator over a configuration and a store
pub fn activator(config: DlmConfig, store: MemoryStore) -> (FragmentActivator, Arc<MemoryStore>) {
    let store = Arc::new(store);
    let activator = FragmentActivator::new(Arc::new(config), store.clone(), store.clone());
    (activator, store)
}
