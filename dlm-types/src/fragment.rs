//! Fragment definitions.

use crate::audience::{Evaluator, Person};
use crate::OwnerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable descriptor of one layout fragment
///
/// Definitions are created when configuration is loaded and are only ever
/// read by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentDefinition {
    /// Display name
    pub name: String,

    /// Logical name of the pseudo-user owning the fragment layout
    #[serde(rename = "owner")]
    pub owner_id: OwnerId,

    /// Merge priority; higher precedence wins overlaps downstream
    #[serde(default)]
    pub precedence: f64,

    /// Ordinal of the fragment in configuration order
    #[serde(default)]
    pub index: usize,

    /// Template owner to copy when the fragment owner must be created
    #[serde(default)]
    pub default_layout_owner: Option<String>,

    /// Audience predicates; an empty set applies to no one
    #[serde(default)]
    pub audience: Vec<Evaluator>,
}

impl FragmentDefinition {
    pub fn new(name: impl Into<String>, owner_id: impl Into<OwnerId>) -> Self {
        FragmentDefinition {
            name: name.into(),
            owner_id: owner_id.into(),
            precedence: 0.0,
            index: 0,
            default_layout_owner: None,
            audience: Vec::new(),
        }
    }

    pub fn with_precedence(mut self, precedence: f64) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_default_layout_owner(mut self, owner: impl Into<String>) -> Self {
        self.default_layout_owner = Some(owner.into());
        self
    }

    pub fn with_evaluator(mut self, evaluator: Evaluator) -> Self {
        self.audience.push(evaluator);
        self
    }

    /// A fragment without evaluators is never merged into any layout
    pub fn is_no_audience_included(&self) -> bool {
        self.audience.is_empty()
    }

    /// True if any evaluator selects this person
    pub fn applies_to(&self, person: &Person) -> bool {
        self.audience.iter().any(|e| e.applies_to(person))
    }
}

impl fmt::Display for FragmentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, #{})", self.name, self.owner_id, self.index)
    }
}
