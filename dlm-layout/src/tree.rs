//! In-memory layout tree.

use dlm_types::constants::ATT_ID;

/// A node in the layout tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// The node identifier, if any
    pub fn id(&self) -> Option<&str> {
        self.attribute(ATT_ID)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Depth-first search for the element carrying `id`
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find_by_id(id))
    }
}

/// A layout document: a `layout` element wrapping a single root folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDocument {
    pub root: Element,
}

impl LayoutDocument {
    pub fn new(root: Element) -> Self {
        LayoutDocument { root }
    }

    /// The identifier on the document element (the fragment label once stamped)
    pub fn id(&self) -> Option<&str> {
        self.root.id()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.root.set_attribute(ATT_ID, id);
    }

    /// The single folder directly below the document element
    pub fn root_folder(&self) -> Option<&Element> {
        self.root.child_elements().next()
    }

    pub fn root_folder_mut(&mut self) -> Option<&mut Element> {
        self.root.child_elements_mut().next()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.root.find_by_id(id)
    }
}
