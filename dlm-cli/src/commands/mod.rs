//! CLI command implementations.

pub mod activate;
pub mod audience;
pub mod show;

pub use activate::activate;
pub use audience::audience;
pub use show::show;

use anyhow::{Context, Result};
use dlm_core::{DlmConfig, MemoryStore};
use dlm_engine::FragmentActivator;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration and store locations given on the command line
pub struct Paths {
    pub config: PathBuf,
    pub store: Option<PathBuf>,
}

impl Paths {
    pub fn new(config: PathBuf, store: Option<PathBuf>) -> Self {
        Paths { config, store }
    }
}

/// Load configuration and store and build an activator over them
pub fn load(paths: &Paths) -> Result<(FragmentActivator, Arc<MemoryStore>)> {
    let config = DlmConfig::from_file(&paths.config).with_context(|| {
        format!("Failed to load configuration from {}", paths.config.display())
    })?;

    let store_path = match &paths.store {
        Some(path) => path.clone(),
        None => config.resolve_relative(Path::new("store.yml")),
    };
    let store = MemoryStore::from_file(&store_path)
        .with_context(|| format!("Failed to load store from {}", store_path.display()))?;

    Ok(dlm_core::activator(config, store))
}

/// Parse a `key=value` person attribute
pub fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("attribute name is empty in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
