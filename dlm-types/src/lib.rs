//! Shared types for dlm
//!
//! This crate provides the value types used across the fragment engine:
//! owner and user identifiers, fragment definitions with their audience
//! evaluators, user profiles, and stylesheet preference sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod audience;
pub mod fragment;

pub use audience::{AttributePattern, Evaluator, Person};
pub use fragment::FragmentDefinition;

/// Names and prefixes shared with the downstream merge stage.
///
/// These values are part of the layout document contract and must not change.
pub mod constants {
    /// Identifier attribute carried by every layout node
    pub const ATT_ID: &str = "ID";

    /// Prefix introducing the owning user id in a namespaced identifier
    pub const FRAGMENT_ID_USER_PREFIX: &str = "U";

    /// Prefix introducing the layout id in a namespaced identifier
    pub const FRAGMENT_ID_LAYOUT_PREFIX: &str = "L";

    /// Namespace URI of the auxiliary DLM attributes
    pub const DLM_NS_URI: &str = "http://www.uportal.org/layout/dlm";

    /// Namespace declaration binding the `dlm` prefix
    pub const DLM_NS_DECL: &str = "xmlns:dlm";

    /// Fragment index stamped on namespaced nodes
    pub const ATT_FRAGMENT: &str = "dlm:fragment";

    /// Fragment precedence stamped on namespaced nodes
    pub const ATT_PRECEDENCE: &str = "dlm:precedence";

    pub const ELEM_FOLDER: &str = "folder";
    pub const ATT_TYPE: &str = "type";
    pub const ATT_HIDDEN: &str = "hidden";
    pub const FOLDER_TYPE_REGULAR: &str = "regular";

    /// Profile functional name used for fragment owners
    pub const DEFAULT_PROFILE_FNAME: &str = "default";

    /// DLM property naming the template owner for new fragment owners
    pub const PROP_DEFAULT_LAYOUT_OWNER: &str = "defaultLayoutOwner";

    /// System property naming the portal-wide template user
    pub const PROP_TEMPLATE_USER_NAME: &str = "templateUserName";
}

/// Logical name of a fragment owner (a pseudo-user)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        OwnerId(id.to_string())
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> Self {
        OwnerId(id)
    }
}

/// Numeric portal user id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Id of an owner that has not been bound to a user yet
    pub const UNBOUND: UserId = UserId(-1);

    pub fn is_bound(&self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build the globally unique label of a fragment layout: `U<user>L<layout>`
pub fn fragment_label(user: UserId, layout_id: i32) -> String {
    format!(
        "{}{}{}{}",
        constants::FRAGMENT_ID_USER_PREFIX,
        user,
        constants::FRAGMENT_ID_LAYOUT_PREFIX,
        layout_id
    )
}

/// A user profile selecting the layout and stylesheets to render with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i32,
    pub fname: String,
    pub layout_id: i32,

    #[serde(default)]
    pub structure_stylesheet_id: i32,

    #[serde(default)]
    pub theme_stylesheet_id: i32,
}

impl UserProfile {
    /// True when both stylesheets are configured (zero means unset)
    pub fn has_stylesheets(&self) -> bool {
        self.structure_stylesheet_id != 0 && self.theme_stylesheet_id != 0
    }
}

/// Which node entries of a preference set an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceScope {
    Folders,
    Channels,
}

/// Per-node attribute values keyed by node id
pub type NodeAttributes = BTreeMap<String, BTreeMap<String, String>>;

/// User preferences for a structure or theme stylesheet
///
/// Folder and channel entries are keyed by the layout node id they apply to,
/// so they must be renamed alongside the layout when it is namespaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSet {
    #[serde(default)]
    pub stylesheet_id: i32,

    #[serde(default)]
    pub parameters: BTreeMap<String, String>,

    #[serde(default)]
    pub folders: NodeAttributes,

    #[serde(default)]
    pub channels: NodeAttributes,
}

impl PreferenceSet {
    pub fn new(stylesheet_id: i32) -> Self {
        PreferenceSet {
            stylesheet_id,
            ..Default::default()
        }
    }

    /// Set an attribute value on a folder or channel entry
    pub fn set_attribute(
        &mut self,
        scope: PreferenceScope,
        node_id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.entries_mut(scope)
            .entry(node_id.into())
            .or_default()
            .insert(name.into(), value.into());
    }

    /// Ids of the entries in the given scope
    pub fn ids(&self, scope: PreferenceScope) -> Vec<String> {
        self.entries(scope).keys().cloned().collect()
    }

    /// Move an entry to a new id, keeping its attributes
    ///
    /// Returns false if no entry exists under `old_id`.
    pub fn change_id(&mut self, scope: PreferenceScope, old_id: &str, new_id: String) -> bool {
        let entries = self.entries_mut(scope);
        match entries.remove(old_id) {
            Some(attributes) => {
                entries.insert(new_id, attributes);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self, scope: PreferenceScope) -> &NodeAttributes {
        match scope {
            PreferenceScope::Folders => &self.folders,
            PreferenceScope::Channels => &self.channels,
        }
    }

    fn entries_mut(&mut self, scope: PreferenceScope) -> &mut NodeAttributes {
        match scope {
            PreferenceScope::Folders => &mut self.folders,
            PreferenceScope::Channels => &mut self.channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_label() {
        assert_eq!(fragment_label(UserId(17), 42), "U17L42");
    }

    #[test]
    fn test_unbound_user() {
        assert!(!UserId::UNBOUND.is_bound());
        assert!(UserId(0).is_bound());
    }

    #[test]
    fn test_profile_stylesheets() {
        let mut profile = UserProfile {
            id: 1,
            fname: "default".into(),
            layout_id: 1,
            structure_stylesheet_id: 4,
            theme_stylesheet_id: 0,
        };
        assert!(!profile.has_stylesheets());

        profile.theme_stylesheet_id = 6;
        assert!(profile.has_stylesheets());
    }

    #[test]
    fn test_change_preference_id() {
        let mut prefs = PreferenceSet::new(4);
        prefs.set_attribute(PreferenceScope::Channels, "n7", "width", "100%");

        assert!(prefs.change_id(PreferenceScope::Channels, "n7", "U1L1n7".into()));
        assert!(!prefs.change_id(PreferenceScope::Channels, "n7", "x".into()));
        assert_eq!(prefs.ids(PreferenceScope::Channels), vec!["U1L1n7".to_string()]);
        assert_eq!(prefs.channels["U1L1n7"]["width"], "100%");
        assert!(prefs.folders.is_empty());
    }
}
