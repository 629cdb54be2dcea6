//! Rewriting node identifiers into their globally unique form.
//!
//! Layout nodes are numbered per user (`s12` for folders, `n7` for channels),
//! so two fragments routinely reuse the same ids. Before a fragment can be
//! merged its ids are prefixed with the fragment label `U<user>L<layout>`,
//! and every rewritten node is stamped with the fragment's index and
//! precedence for the merge stage.

use crate::tree::{Element, LayoutDocument};
use dlm_types::constants::{
    ATT_FRAGMENT, ATT_ID, ATT_PRECEDENCE, DLM_NS_DECL, DLM_NS_URI, FRAGMENT_ID_USER_PREFIX,
};
use dlm_types::{PreferenceScope, PreferenceSet};

/// Label and ordering metadata applied to every node of one fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentStamp {
    /// Prefix for node ids, `U<user>L<layout>`
    pub label: String,

    /// Decimal fragment index
    pub index: String,

    /// Decimal fragment precedence
    pub precedence: String,
}

impl FragmentStamp {
    pub fn new(label: impl Into<String>, index: usize, precedence: f64) -> Self {
        FragmentStamp {
            label: label.into(),
            index: index.to_string(),
            precedence: precedence.to_string(),
        }
    }
}

/// True if `id` already carries a fragment label
pub fn is_namespaced(id: &str) -> bool {
    id.starts_with(FRAGMENT_ID_USER_PREFIX)
}

/// Namespace every node below the document element
///
/// Nodes are visited depth-first in document order. A node with an empty id
/// is left alone but its children are still visited; a node whose id is
/// already namespaced is left untouched, so applying this twice is the same
/// as applying it once.
pub fn namespace_layout(mut doc: LayoutDocument, stamp: &FragmentStamp) -> LayoutDocument {
    if doc.root.attribute(DLM_NS_DECL).is_none() {
        doc.root.set_attribute(DLM_NS_DECL, DLM_NS_URI);
    }

    let mut pending: Vec<&mut Element> = doc.root.child_elements_mut().collect();
    pending.reverse();

    while let Some(element) = pending.pop() {
        stamp_element(element, stamp);

        let first_child = pending.len();
        pending.extend(element.child_elements_mut());
        pending[first_child..].reverse();
    }

    doc
}

fn stamp_element(element: &mut Element, stamp: &FragmentStamp) {
    let new_id = match element.attribute(ATT_ID) {
        Some(id) if !id.is_empty() && !is_namespaced(id) => format!("{}{}", stamp.label, id),
        _ => return,
    };

    element.set_attribute(ATT_ID, new_id);
    element.set_attribute(ATT_FRAGMENT, stamp.index.as_str());
    element.set_attribute(ATT_PRECEDENCE, stamp.precedence.as_str());
}

/// Prefix the ids of the given entry scopes with `label`
pub fn namespace_preferences(
    mut prefs: PreferenceSet,
    label: &str,
    scopes: &[PreferenceScope],
) -> PreferenceSet {
    for &scope in scopes {
        for id in prefs.ids(scope) {
            if !is_namespaced(&id) {
                prefs.change_id(scope, &id, format!("{label}{id}"));
            }
        }
    }
    prefs
}

/// Structure stylesheet preferences carry both folder and channel entries
pub fn namespace_structure_preferences(prefs: PreferenceSet, label: &str) -> PreferenceSet {
    namespace_preferences(
        prefs,
        label,
        &[PreferenceScope::Folders, PreferenceScope::Channels],
    )
}

/// Theme stylesheet preferences only carry channel entries
pub fn namespace_theme_preferences(prefs: PreferenceSet, label: &str) -> PreferenceSet {
    namespace_preferences(prefs, label, &[PreferenceScope::Channels])
}
