//! Configuration parsing and management.

use dlm_engine::ConfigSource;
use dlm_layout::LayoutError;
use dlm_types::FragmentDefinition;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid layout {}: {source}", path.display())]
    Layout {
        path: PathBuf,
        #[source]
        source: LayoutError,
    },
}

/// Main configuration struct matching the dlm.yml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DlmConfig {
    /// Distributed layout properties, e.g. `defaultLayoutOwner`
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Portal-wide properties, e.g. `templateUserName`
    #[serde(default)]
    pub system: BTreeMap<String, String>,

    #[serde(default)]
    pub fragments: Vec<FragmentDefinition>,

    // Path to config file, for relative path resolution
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl DlmConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse configuration from YAML text
    ///
    /// Fragments are numbered in the order they are listed.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let mut config: DlmConfig = serde_yaml::from_str(contents)?;
        for (index, fragment) in config.fragments.iter_mut().enumerate() {
            fragment.index = index;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut owners = HashSet::new();
        for fragment in &self.fragments {
            if fragment.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "fragment #{} has no name",
                    fragment.index
                )));
            }
            if fragment.owner_id.as_str().trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "fragment '{}' has no owner",
                    fragment.name
                )));
            }
            if !owners.insert(fragment.owner_id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "owner '{}' is used by more than one fragment",
                    fragment.owner_id
                )));
            }
        }
        Ok(())
    }

    /// Resolve a path relative to the config file location
    pub fn resolve_relative(&self, path: &Path) -> PathBuf {
        resolve_against(self.config_path.as_deref(), path)
    }
}

impl ConfigSource for DlmConfig {
    fn fragments(&self) -> &[FragmentDefinition] {
        &self.fragments
    }

    fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    fn system_property(&self, name: &str) -> Option<&str> {
        self.system.get(name).map(String::as_str)
    }

    fn property_count(&self) -> usize {
        self.properties.len()
    }
}

/// Resolve `path` against the directory containing `file`
pub(crate) fn resolve_against(file: Option<&Path>, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match file.and_then(Path::parent) {
        Some(parent) => parent.join(path),
        None => path.to_path_buf(),
    }
}
