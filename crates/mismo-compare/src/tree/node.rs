//! Element node and its derived paths

use std::fmt;

/// Separator between path segments
pub const XPATH_DELIMITER: &str = "/";
/// Separator between a segment's type and its attribute entries
pub const OBJ_PATH_DELIMITER: &str = "|";
/// Separator between an attribute key and its value
pub const ENTRY_DELIMITER: &str = ":";
/// Name reported for elements without a label
pub const NOT_SET: &str = "NOT_SET";

/// Index of a node inside its [`ElementTree`](crate::tree::ElementTree)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A scalar field carried directly by an element
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{ENTRY_DELIMITER}{}", self.key, self.value)
    }
}

/// One element of a document tree
///
/// Nodes are created once while the tree is built and never change afterwards.
/// Children are owned by the tree's arena; `parent` is a plain back-link.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementNode {
    pub(crate) kind: String,
    pub(crate) name: Option<String>,
    pub(crate) index: Option<usize>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) xpath: Vec<String>,
    pub(crate) traversal: Vec<String>,
    pub(crate) object_path: Vec<String>,
}

impl ElementNode {
    /// Element type name
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Label of the element, or [`NOT_SET`]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(NOT_SET)
    }

    pub fn label(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Position among same-type siblings, for repeated elements
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Scalar fields, sorted
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn child_ids(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn xpath(&self) -> &[String] {
        &self.xpath
    }

    pub fn traversal(&self) -> &[String] {
        &self.traversal
    }

    pub fn object_path(&self) -> &[String] {
        &self.object_path
    }

    /// `/MESSAGE/DEAL_SETS/DEAL_SET[0]/...`; the root renders as `/`
    pub fn xpath_str(&self) -> String {
        format!("{XPATH_DELIMITER}{}", self.xpath.join(XPATH_DELIMITER))
    }

    /// Type sequence from the root, without repetition indices
    pub fn traversal_str(&self) -> String {
        self.traversal.join(XPATH_DELIMITER)
    }

    /// Traversal path with each segment's attributes appended
    pub fn object_path_str(&self) -> String {
        self.object_path.join(XPATH_DELIMITER)
    }

    pub(crate) fn xpath_segment(kind: &str, index: Option<usize>) -> String {
        match index {
            Some(i) => format!("{kind}[{i}]"),
            None => kind.to_string(),
        }
    }

    pub(crate) fn object_segment(kind: &str, attributes: &[Attribute]) -> String {
        let mut segment = kind.to_string();
        for attr in attributes {
            segment.push_str(OBJ_PATH_DELIMITER);
            segment.push_str(&attr.to_string());
        }
        segment
    }
}
