//! In-memory identity and layout store seeded from YAML
//!
//! The seed file lists portal users with their default profile, layout and
//! stylesheet preferences, plus the system profiles used by owners that have
//! not selected stylesheets:
//!
//! ```yaml
//! users:
//!   - name: templateUser
//!     id: 10
//!     profile: { id: 1, fname: default, layout_id: 1, structure_stylesheet_id: 4, theme_stylesheet_id: 5 }
//!     layout: layouts/template.xml
//! system_profiles:
//!   - { id: 2, fname: default, layout_id: 1, structure_stylesheet_id: 4, theme_stylesheet_id: 5 }
//! ```

use crate::config::{resolve_against, ConfigError};
use dlm_engine::{IdentityStore, LayoutStore, Owner, StoreError};
use dlm_layout::LayoutDocument;
use dlm_types::constants::DEFAULT_PROFILE_FNAME;
use dlm_types::{OwnerId, PreferenceSet, UserId, UserProfile};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
struct StoreSeed {
    #[serde(default)]
    users: Vec<UserSeed>,

    #[serde(default)]
    system_profiles: Vec<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct UserSeed {
    name: OwnerId,
    id: i64,
    profile: UserProfile,

    /// Path to the layout XML, relative to the seed file
    #[serde(default)]
    layout: Option<PathBuf>,

    /// Layout XML given inline
    #[serde(default)]
    layout_xml: Option<String>,

    #[serde(default)]
    structure_preferences: PreferenceSet,

    #[serde(default)]
    theme_preferences: PreferenceSet,
}

#[derive(Debug, Clone)]
struct StoredUser {
    id: UserId,
    profile: UserProfile,
    layout: Option<LayoutDocument>,
    structure: PreferenceSet,
    theme: PreferenceSet,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<OwnerId, StoredUser>>,
    system_profiles: HashMap<String, UserProfile>,
    next_id: AtomicI64,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a YAML seed file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents, Some(path))
    }

    /// Build a store from YAML seed text
    ///
    /// Relative layout paths resolve against the directory of `seed_path`.
    pub fn from_yaml(contents: &str, seed_path: Option<&Path>) -> Result<Self, ConfigError> {
        let seed: StoreSeed = serde_yaml::from_str(contents)?;
        let store = MemoryStore::new();

        for user in seed.users {
            let layout = match (&user.layout, user.layout_xml) {
                (Some(file), _) => {
                    let path = resolve_against(seed_path, file);
                    let xml = std::fs::read_to_string(&path)?;
                    Some(parse_layout(&xml, path)?)
                }
                (None, Some(xml)) => Some(parse_layout(&xml, PathBuf::from(user.name.as_str()))?),
                (None, None) => None,
            };
            store.add_user(
                user.name,
                StoredUser {
                    id: UserId(user.id),
                    profile: user.profile,
                    layout,
                    structure: user.structure_preferences,
                    theme: user.theme_preferences,
                },
            );
        }

        let system_profiles = seed
            .system_profiles
            .into_iter()
            .map(|profile| (profile.fname.clone(), profile))
            .collect();

        Ok(MemoryStore {
            system_profiles,
            ..store
        })
    }

    fn add_user(&self, name: OwnerId, user: StoredUser) {
        self.next_id.fetch_max(user.id.0 + 1, Ordering::SeqCst);
        self.users.write().insert(name, user);
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    /// Number of layouts written through [`LayoutStore::save_layout`]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// The stored layout of `owner`, if any
    pub fn layout_of(&self, owner: &OwnerId) -> Option<LayoutDocument> {
        self.users.read().get(owner).and_then(|user| user.layout.clone())
    }

    fn with_user<T>(
        &self,
        owner: &OwnerId,
        f: impl FnOnce(&StoredUser) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let users = self.users.read();
        let user = users
            .get(owner)
            .ok_or_else(|| StoreError::not_found("user", owner.as_str()))?;
        f(user)
    }
}

fn parse_layout(xml: &str, path: PathBuf) -> Result<LayoutDocument, ConfigError> {
    LayoutDocument::parse(xml).map_err(|source| ConfigError::Layout { path, source })
}

impl IdentityStore for MemoryStore {
    fn resolve_id(
        &self,
        owner: &OwnerId,
        allow_create: bool,
    ) -> Result<Option<UserId>, StoreError> {
        match self.users.read().get(owner) {
            Some(user) => Ok(Some(user.id)),
            None if allow_create => Ok(None),
            None => Err(StoreError::not_found("user", owner.as_str())),
        }
    }

    fn provision(&self, owner: &OwnerId, template: &str) -> Result<UserId, StoreError> {
        let mut users = self.users.write();
        if users.contains_key(owner) {
            return Err(StoreError::Backend(format!("user '{owner}' already exists")));
        }
        let template_user = users
            .get(&OwnerId::from(template))
            .cloned()
            .ok_or_else(|| StoreError::not_found("template user", template))?;

        let id = UserId(self.next_id.fetch_add(1, Ordering::SeqCst));
        debug!(%owner, %template, %id, "created user from template");
        users.insert(owner.clone(), StoredUser { id, ..template_user });
        Ok(id)
    }
}

impl LayoutStore for MemoryStore {
    fn default_profile(&self, owner: &Owner) -> Result<UserProfile, StoreError> {
        self.with_user(&owner.username, |user| {
            if user.profile.fname == DEFAULT_PROFILE_FNAME {
                Ok(user.profile.clone())
            } else {
                Err(StoreError::not_found(
                    "profile",
                    format!("{}/{}", owner.username, DEFAULT_PROFILE_FNAME),
                ))
            }
        })
    }

    fn system_profile(&self, fname: &str) -> Result<UserProfile, StoreError> {
        self.system_profiles
            .get(fname)
            .cloned()
            .ok_or_else(|| StoreError::not_found("system profile", fname))
    }

    fn fragment_layout(
        &self,
        owner: &Owner,
        _profile: &UserProfile,
    ) -> Result<LayoutDocument, StoreError> {
        self.with_user(&owner.username, |user| {
            user.layout
                .clone()
                .ok_or_else(|| StoreError::not_found("layout", owner.username.as_str()))
        })
    }

    fn structure_preferences(
        &self,
        owner: &Owner,
        _profile_id: i32,
        stylesheet_id: i32,
    ) -> Result<PreferenceSet, StoreError> {
        self.with_user(&owner.username, |user| {
            Ok(PreferenceSet {
                stylesheet_id,
                ..user.structure.clone()
            })
        })
    }

    fn theme_preferences(
        &self,
        owner: &Owner,
        _profile_id: i32,
        stylesheet_id: i32,
    ) -> Result<PreferenceSet, StoreError> {
        self.with_user(&owner.username, |user| {
            Ok(PreferenceSet {
                stylesheet_id,
                ..user.theme.clone()
            })
        })
    }

    fn save_layout(
        &self,
        owner: &Owner,
        profile: &UserProfile,
        layout: &LayoutDocument,
        is_fragment: bool,
        clear_cache: bool,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write();
        let user = users
            .get_mut(&owner.username)
            .ok_or_else(|| StoreError::not_found("user", owner.username.as_str()))?;

        debug!(owner = %owner.username, profile = profile.id, is_fragment, clear_cache, "saving layout");
        user.layout = Some(layout.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
