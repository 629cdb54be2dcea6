//! # dlm-layout
//!
//! Layout documents and the tree transformations applied to a fragment
//! before it can be merged into other layouts.
//!
//! ```text
//! raw layout → sanitize → namespace_layout → published view
//! ```
//!
//! Every transformation takes the document by value and hands it back, so a
//! document still being transformed can never alias one that has already been
//! published.

pub mod namespace;
pub mod sanitize;
pub mod tree;
pub mod xml;

pub use namespace::{
    is_namespaced, namespace_layout, namespace_preferences, namespace_structure_preferences,
    namespace_theme_preferences, FragmentStamp,
};
pub use sanitize::{is_excluded_folder, sanitize};
pub use tree::{Element, LayoutDocument, Node};

/// Errors that can occur while reading or transforming a layout
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("XML parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    #[error("Malformed layout: {0}")]
    Malformed(String),

    #[error("Failed to write XML: {0}")]
    Write(String),

    #[error("Layout has no root folder")]
    MissingRootFolder,
}

pub type Result<T> = std::result::Result<T, LayoutError>;
