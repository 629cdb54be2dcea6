//! Binding fragments to their owning pseudo-users.

use crate::error::ActivationError;
use crate::store::{ConfigSource, IdentityStore, Owner};
use dlm_types::constants::{PROP_DEFAULT_LAYOUT_OWNER, PROP_TEMPLATE_USER_NAME};
use dlm_types::{FragmentDefinition, UserId};
use tracing::debug;

/// Resolves a fragment's owner, creating it from a template when missing
pub struct OwnerBinder<'a> {
    identity: &'a dyn IdentityStore,
    config: &'a dyn ConfigSource,
}

impl<'a> OwnerBinder<'a> {
    pub fn new(identity: &'a dyn IdentityStore, config: &'a dyn ConfigSource) -> Self {
        OwnerBinder { identity, config }
    }

    pub fn bind(&self, fragment: &FragmentDefinition) -> Result<Owner, ActivationError> {
        let mut owner = Owner::new(fragment.owner_id.clone());

        if let Some(id) = self.lookup(&owner) {
            owner.id = id;
            return Ok(owner);
        }

        let template = self.template_owner(fragment)?;
        debug!(
            owner = %owner.username,
            fragment = %fragment.name,
            template = %template,
            "owner not found, creating as copy of template"
        );

        match self.identity.provision(&owner.username, &template) {
            Ok(id) => {
                owner.id = id;
                owner.newly_created = id.is_bound();
            }
            Err(source) => {
                // Another process may have created the owner first
                let Some(id) = self.lookup(&owner) else {
                    return Err(ActivationError::Provision {
                        owner: owner.username,
                        fragment: fragment.name.clone(),
                        source,
                    });
                };
                debug!(owner = %owner.username, %id, "owner appeared while provisioning");
                owner.id = id;
            }
        }

        Ok(owner)
    }

    /// The user to copy when creating the owner of `fragment`
    ///
    /// The fragment's own setting wins over the `defaultLayoutOwner` property,
    /// which wins over the system template user.
    pub fn template_owner(&self, fragment: &FragmentDefinition) -> Result<String, ActivationError> {
        fragment
            .default_layout_owner
            .clone()
            .or_else(|| {
                self.config
                    .property(PROP_DEFAULT_LAYOUT_OWNER)
                    .map(str::to_string)
            })
            .or_else(|| {
                self.config
                    .system_property(PROP_TEMPLATE_USER_NAME)
                    .map(str::to_string)
            })
            .ok_or_else(|| ActivationError::NoTemplateOwner {
                owner: fragment.owner_id.clone(),
                fragment: fragment.name.clone(),
            })
    }

    fn lookup(&self, owner: &Owner) -> Option<UserId> {
        match self.identity.resolve_id(&owner.username, false) {
            Ok(found) => found.filter(|id| id.is_bound()),
            Err(err) => {
                // Stores may report a missing user as an error when not creating
                debug!(owner = %owner.username, error = %err, "owner lookup failed, treating as not found");
                None
            }
        }
    }
}
