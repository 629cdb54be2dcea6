//! Collaborator contracts consumed by the engine
//!
//! Identity, persistence and configuration live outside the engine. Calls
//! through these traits are expected to block the calling thread.

use crate::error::StoreError;
use dlm_layout::LayoutDocument;
use dlm_types::{FragmentDefinition, OwnerId, PreferenceSet, UserId, UserProfile};

/// A fragment owner as bound during one activation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub username: OwnerId,

    /// `UserId::UNBOUND` until resolved
    pub id: UserId,

    /// Set when the owner was provisioned during this activation
    pub newly_created: bool,
}

impl Owner {
    pub fn new(username: OwnerId) -> Self {
        Owner {
            username,
            id: UserId::UNBOUND,
            newly_created: false,
        }
    }
}

/// Maps owner names to portal user ids
pub trait IdentityStore: Send + Sync {
    /// Look up the user id of `owner`
    ///
    /// Returns `Ok(None)` when the owner does not exist. Some stores report a
    /// missing owner as an error instead when `allow_create` is false.
    fn resolve_id(&self, owner: &OwnerId, allow_create: bool)
        -> Result<Option<UserId>, StoreError>;

    /// Create `owner` as a copy of the `template` user
    fn provision(&self, owner: &OwnerId, template: &str) -> Result<UserId, StoreError>;
}

/// Stores raw layouts, profiles and stylesheet preferences
pub trait LayoutStore: Send + Sync {
    /// The owner's profile named `default`
    fn default_profile(&self, owner: &Owner) -> Result<UserProfile, StoreError>;

    /// The system-wide profile with the given functional name
    fn system_profile(&self, fname: &str) -> Result<UserProfile, StoreError>;

    /// The owner's stored layout for `profile`
    fn fragment_layout(
        &self,
        owner: &Owner,
        profile: &UserProfile,
    ) -> Result<LayoutDocument, StoreError>;

    fn structure_preferences(
        &self,
        owner: &Owner,
        profile_id: i32,
        stylesheet_id: i32,
    ) -> Result<PreferenceSet, StoreError>;

    fn theme_preferences(
        &self,
        owner: &Owner,
        profile_id: i32,
        stylesheet_id: i32,
    ) -> Result<PreferenceSet, StoreError>;

    fn save_layout(
        &self,
        owner: &Owner,
        profile: &UserProfile,
        layout: &LayoutDocument,
        is_fragment: bool,
        clear_cache: bool,
    ) -> Result<(), StoreError>;
}

/// Supplies fragment definitions and properties
pub trait ConfigSource: Send + Sync {
    fn fragments(&self) -> &[FragmentDefinition];

    /// A distributed layout property such as `defaultLayoutOwner`
    fn property(&self, name: &str) -> Option<&str>;

    /// A system-wide property such as `templateUserName`
    fn system_property(&self, name: &str) -> Option<&str>;

    fn property_count(&self) -> usize;
}
