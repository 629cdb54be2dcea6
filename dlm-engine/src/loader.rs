//! Loading fragment layouts and preferences from the layout store.

use crate::error::ActivationError;
use crate::store::{LayoutStore, Owner};
use dlm_layout::LayoutDocument;
use dlm_types::{fragment_label, FragmentDefinition, PreferenceSet, UserProfile};
use tracing::debug;

/// A fragment layout as loaded, before any transformation
#[derive(Debug, Clone)]
pub struct RawLayout {
    /// Profile the layout was loaded with
    pub profile: UserProfile,

    /// Layout whose document element carries `label` as its id
    pub layout: LayoutDocument,

    /// Globally unique label `U<user>L<layout>`
    pub label: String,
}

/// Structure and theme preferences of a fragment owner
#[derive(Debug, Clone)]
pub struct RawPreferences {
    pub structure: PreferenceSet,
    pub theme: PreferenceSet,
}

pub struct LayoutLoader<'a> {
    store: &'a dyn LayoutStore,
}

impl<'a> LayoutLoader<'a> {
    pub fn new(store: &'a dyn LayoutStore) -> Self {
        LayoutLoader { store }
    }

    /// Load the owner's layout and stamp it with the fragment label
    ///
    /// Owners that have no stylesheets selected yet fall back to the system
    /// profile of the same name.
    pub fn load_layout(
        &self,
        owner: &Owner,
        fragment: &FragmentDefinition,
    ) -> Result<RawLayout, ActivationError> {
        if !owner.id.is_bound() {
            return Err(ActivationError::Unbound {
                owner: owner.username.clone(),
                fragment: fragment.name.clone(),
            });
        }

        let mut profile = self
            .store
            .default_profile(owner)
            .map_err(ActivationError::load(fragment))?;

        if !profile.has_stylesheets() {
            debug!(
                owner = %owner.username,
                profile = %profile.fname,
                "owner has no stylesheets selected, using system profile"
            );
            profile = self
                .store
                .system_profile(&profile.fname)
                .map_err(ActivationError::load(fragment))?;
        }

        let mut layout = self
            .store
            .fragment_layout(owner, &profile)
            .map_err(ActivationError::load(fragment))?;

        let label = fragment_label(owner.id, profile.layout_id);
        layout.set_id(label.as_str());

        Ok(RawLayout {
            profile,
            layout,
            label,
        })
    }

    /// Write a freshly provisioned owner's layout back to the store
    ///
    /// Until this happens the store would answer later loads with its generic
    /// default layout instead of the fragment template.
    pub fn persist(
        &self,
        owner: &Owner,
        raw: &RawLayout,
        fragment: &FragmentDefinition,
    ) -> Result<(), ActivationError> {
        debug!(owner = %owner.username, profile = raw.profile.id, "saving layout of new fragment owner");
        self.store
            .save_layout(owner, &raw.profile, &raw.layout, true, false)
            .map_err(|source| ActivationError::Persist {
                fragment: fragment.name.clone(),
                source,
            })
    }

    pub fn load_preferences(
        &self,
        owner: &Owner,
        profile: &UserProfile,
        fragment: &FragmentDefinition,
    ) -> Result<RawPreferences, ActivationError> {
        if !owner.id.is_bound() {
            return Err(ActivationError::Unbound {
                owner: owner.username.clone(),
                fragment: fragment.name.clone(),
            });
        }

        let structure = self
            .store
            .structure_preferences(owner, profile.id, profile.structure_stylesheet_id)
            .map_err(ActivationError::preferences(fragment))?;
        let theme = self
            .store
            .theme_preferences(owner, profile.id, profile.theme_stylesheet_id)
            .map_err(ActivationError::preferences(fragment))?;

        Ok(RawPreferences { structure, theme })
    }
}
