//! Errors raised by collaborators and by fragment activation.

use dlm_layout::LayoutError;
use dlm_types::{FragmentDefinition, OwnerId};
use std::error::Error;

/// Failure reported by an identity or layout store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("Invalid layout document: {0}")]
    Layout(#[from] LayoutError),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            key: key.into(),
        }
    }
}

/// Why a fragment could not be activated
///
/// Every variant is scoped to a single fragment: the fragment is left out of
/// user layouts and all other fragments are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error(
        "no template owner is configured; owner '{owner}' of fragment '{fragment}' cannot be created"
    )]
    NoTemplateOwner { owner: OwnerId, fragment: String },

    #[error("failed to create owner '{owner}' of fragment '{fragment}'")]
    Provision {
        owner: OwnerId,
        fragment: String,
        #[source]
        source: StoreError,
    },

    #[error("owner '{owner}' of fragment '{fragment}' is not bound to a user")]
    Unbound { owner: OwnerId, fragment: String },

    #[error("failed to load layout for fragment '{fragment}'")]
    Load {
        fragment: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to save the layout of newly created owner for fragment '{fragment}'")]
    Persist {
        fragment: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to load stylesheet preferences for fragment '{fragment}'")]
    Preferences {
        fragment: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to strip layout of fragment '{fragment}'")]
    Sanitize {
        fragment: String,
        #[source]
        source: LayoutError,
    },
}

impl ActivationError {
    pub(crate) fn load(fragment: &FragmentDefinition) -> impl FnOnce(StoreError) -> Self + '_ {
        move |source| ActivationError::Load {
            fragment: fragment.name.clone(),
            source,
        }
    }

    pub(crate) fn preferences(
        fragment: &FragmentDefinition,
    ) -> impl FnOnce(StoreError) -> Self + '_ {
        move |source| ActivationError::Preferences {
            fragment: fragment.name.clone(),
            source,
        }
    }

    /// True when the failure comes from missing configuration rather than I/O
    pub fn is_configuration(&self) -> bool {
        matches!(self, ActivationError::NoTemplateOwner { .. })
    }

    /// The error and all of its causes on one line
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            report.push_str(": ");
            report.push_str(&cause.to_string());
            source = cause.source();
        }
        report
    }
}
