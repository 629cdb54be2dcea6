//! The activation pipeline turning one fragment definition into a view
//!
//! ```text
//! bind owner → load layout → (save if owner is new) → load preferences
//!            → sanitize → namespace layout → namespace preferences → view
//! ```
//!
//! The pipeline stops at the first failure. It holds no state between runs;
//! serializing runs per owner is the cache's job.

use crate::binder::OwnerBinder;
use crate::error::ActivationError;
use crate::loader::LayoutLoader;
use crate::store::{ConfigSource, IdentityStore, LayoutStore};
use crate::view::UserView;
use dlm_layout::{
    namespace_layout, namespace_structure_preferences, namespace_theme_preferences, sanitize,
    FragmentStamp,
};
use dlm_types::FragmentDefinition;
use std::sync::Arc;

#[derive(Clone)]
pub struct ActivationPipeline {
    identity: Arc<dyn IdentityStore>,
    layouts: Arc<dyn LayoutStore>,
    config: Arc<dyn ConfigSource>,
}

impl ActivationPipeline {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        layouts: Arc<dyn LayoutStore>,
        config: Arc<dyn ConfigSource>,
    ) -> Self {
        ActivationPipeline {
            identity,
            layouts,
            config,
        }
    }

    pub fn activate(&self, fragment: &FragmentDefinition) -> Result<UserView, ActivationError> {
        let owner = OwnerBinder::new(&*self.identity, &*self.config).bind(fragment)?;

        let loader = LayoutLoader::new(&*self.layouts);
        let raw = loader.load_layout(&owner, fragment)?;
        if owner.newly_created {
            loader.persist(&owner, &raw, fragment)?;
        }
        let prefs = loader.load_preferences(&owner, &raw.profile, fragment)?;

        let layout = sanitize(raw.layout).map_err(|source| ActivationError::Sanitize {
            fragment: fragment.name.clone(),
            source,
        })?;

        let stamp = FragmentStamp::new(raw.label, fragment.index, fragment.precedence);
        let layout = namespace_layout(layout, &stamp);
        let structure_preferences = namespace_structure_preferences(prefs.structure, &stamp.label);
        let theme_preferences = namespace_theme_preferences(prefs.theme, &stamp.label);

        let profile = raw.profile;
        Ok(UserView {
            owner: owner.username,
            user_id: owner.id,
            fragment_name: fragment.name.clone(),
            fragment_index: fragment.index,
            precedence: fragment.precedence,
            profile_id: profile.id,
            profile_fname: profile.fname,
            layout_id: profile.layout_id,
            structure_stylesheet_id: profile.structure_stylesheet_id,
            theme_stylesheet_id: profile.theme_stylesheet_id,
            layout,
            structure_preferences,
            theme_preferences,
        })
    }
}

impl std::fmt::Debug for ActivationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationPipeline")
            .field("fragments", &self.config.fragments().len())
            .finish_non_exhaustive()
    }
}
