//! Print the activated view of one fragment owner.

use super::{load, Paths};
use anyhow::{bail, Context, Result};
use dlm_types::{OwnerId, PreferenceSet};
use serde::Serialize;

#[derive(Serialize)]
struct Preferences<'a> {
    label: &'a str,
    structure: &'a PreferenceSet,
    theme: &'a PreferenceSet,
}

/// Activate the owner's fragment on demand, without the startup sweep
pub fn show(paths: &Paths, owner: &str, prefs: bool) -> Result<()> {
    let (activator, _) = load(paths)?;
    let owner = OwnerId::from(owner);

    let fragment = activator
        .fragment(&owner)
        .with_context(|| format!("No fragment is owned by '{owner}'"))?;
    let Some(view) = activator.user_view(fragment) else {
        bail!("Fragment '{}' is unavailable", fragment.name);
    };

    if prefs {
        let payload = Preferences {
            label: view.label(),
            structure: &view.structure_preferences,
            theme: &view.theme_preferences,
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        let xml = view
            .layout
            .to_xml()
            .context("Failed to serialize layout")?;
        println!("{xml}");
    }
    Ok(())
}
