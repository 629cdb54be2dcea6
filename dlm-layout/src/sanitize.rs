//! Pruning of top-level folders that must never reach a merge target.

use crate::tree::{LayoutDocument, Node};
use crate::{LayoutError, Result};
use dlm_types::constants::{ATT_HIDDEN, ATT_TYPE, ELEM_FOLDER, FOLDER_TYPE_REGULAR};
use tracing::debug;

/// Remove every top-level folder that is not a visible regular folder
///
/// Header and footer folders, and hidden regular folders such as a user
/// preferences tab, belong to the fragment owner alone. Only the children of
/// the root folder are examined; the order of the survivors is kept.
pub fn sanitize(mut doc: LayoutDocument) -> Result<LayoutDocument> {
    let root_folder = doc.root_folder_mut().ok_or(LayoutError::MissingRootFolder)?;

    let before = root_folder.children.len();
    root_folder.children.retain(|node| !is_excluded_folder(node));
    let removed = before - root_folder.children.len();

    if removed > 0 {
        debug!(removed, "pruned top-level folders");
    }
    Ok(doc)
}

/// True for a folder that is hidden or of any type other than `regular`
pub fn is_excluded_folder(node: &Node) -> bool {
    match node {
        Node::Element(folder) if folder.name == ELEM_FOLDER => {
            folder.attribute(ATT_TYPE) != Some(FOLDER_TYPE_REGULAR)
                || folder.attribute(ATT_HIDDEN) == Some("true")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Element;

    fn folder(id: &str, kind: &str, hidden: bool) -> Element {
        Element::new("folder")
            .with_attribute("ID", id)
            .with_attribute("type", kind)
            .with_attribute("hidden", if hidden { "true" } else { "false" })
    }

    fn top_level_ids(doc: &LayoutDocument) -> Vec<&str> {
        doc.root_folder()
            .unwrap()
            .child_elements()
            .filter_map(Element::id)
            .collect()
    }

    #[test]
    fn test_only_visible_regular_folders_survive() {
        let doc = LayoutDocument::new(
            Element::new("layout").with_child(
                Element::new("folder")
                    .with_attribute("ID", "root")
                    .with_attribute("type", "root")
                    .with_child(folder("s1", "header", false))
                    .with_child(folder("s2", "regular", false))
                    .with_child(folder("s3", "regular", true))
                    .with_child(folder("s4", "regular", false))
                    .with_child(folder("s5", "footer", false)),
            ),
        );

        let doc = sanitize(doc).unwrap();
        assert_eq!(top_level_ids(&doc), vec!["s2", "s4"]);
    }

    #[test]
    fn test_nested_folders_untouched() {
        let tab = folder("s2", "regular", false).with_child(folder("s6", "regular", true));
        let doc = LayoutDocument::new(
            Element::new("layout").with_child(Element::new("folder").with_child(tab)),
        );

        let doc = sanitize(doc).unwrap();
        assert!(doc.find_by_id("s6").is_some());
    }

    #[test]
    fn test_folder_without_type_removed() {
        let doc = LayoutDocument::new(
            Element::new("layout").with_child(
                Element::new("folder")
                    .with_child(Element::new("folder").with_attribute("ID", "s7"))
                    .with_child(Element::new("channel").with_attribute("ID", "n8")),
            ),
        );

        let doc = sanitize(doc).unwrap();
        assert!(doc.find_by_id("s7").is_none());
        assert!(doc.find_by_id("n8").is_some());
    }

    #[test]
    fn test_missing_root_folder() {
        let doc = LayoutDocument::new(Element::new("layout"));
        assert!(matches!(sanitize(doc), Err(LayoutError::MissingRootFolder)));
    }
}
