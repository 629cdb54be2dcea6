//! Activated fragment views.

use dlm_layout::LayoutDocument;
use dlm_types::{OwnerId, PreferenceSet, UserId};

/// A fragment owner's layout and preferences, ready to merge
///
/// Views are immutable once published and shared behind `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserView {
    pub owner: OwnerId,
    pub user_id: UserId,

    pub fragment_name: String,
    pub fragment_index: usize,
    pub precedence: f64,

    pub profile_id: i32,
    pub profile_fname: String,
    pub layout_id: i32,
    pub structure_stylesheet_id: i32,
    pub theme_stylesheet_id: i32,

    /// Sanitized layout with namespaced node ids
    pub layout: LayoutDocument,

    pub structure_preferences: PreferenceSet,
    pub theme_preferences: PreferenceSet,
}

impl UserView {
    /// The fragment label carried on the layout's document element
    pub fn label(&self) -> &str {
        self.layout.id().unwrap_or_default()
    }
}
