//! Document tree model
//!
//! An [`ElementTree`] is built once from the nested mapping of a document.
//! Nodes live in an arena and are addressed by [`NodeId`]; each node carries
//! its sorted scalar attributes and three derived paths:
//!
//! - xpath: segments with repetition indices, unique per node (`PARTY[1]`)
//! - traversal path: the same segments without indices, shared by siblings
//! - object path: the traversal path with attributes appended per segment
//!
//! A [`PathIndex`] over the finished tree maps each element type to the
//! traversal paths that reach it.

pub mod node;
pub mod path_index;

use std::fmt::{self, Write as _};
use std::ops::Deref;

use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::value::{Entry, Object, Value};
use crate::xml::{ATTRIBUTE_PREFIX, TEXT_KEY};

pub use node::{
    Attribute, ElementNode, NodeId, ENTRY_DELIMITER, NOT_SET, OBJ_PATH_DELIMITER, XPATH_DELIMITER,
};
pub use path_index::PathIndex;

/// Options for building a tree from a mapping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Keys with this prefix are markers, never attributes
    pub attribute_prefix: String,
    /// Key holding an element's human label
    pub label_key: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            attribute_prefix: ATTRIBUTE_PREFIX.to_string(),
            label_key: format!("{ATTRIBUTE_PREFIX}xlink:label"),
        }
    }
}

/// A complete, read-only document tree
#[derive(Clone, Debug, PartialEq)]
pub struct ElementTree {
    nodes: Vec<ElementNode>,
    root: NodeId,
    paths: PathIndex,
}

impl ElementTree {
    /// Build a tree with the default configuration
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::with_config(value, &TreeConfig::default())
    }

    /// Build a tree from a document mapping
    ///
    /// The top mapping is the document wrapper; its first key names the root
    /// type and the document element becomes the root's only child.
    #[instrument(skip_all)]
    pub fn with_config(value: &Value, config: &TreeConfig) -> Result<Self> {
        let Value::Object(data) = value else {
            return Err(Error::shape(ErrorKind::NotAMapping {
                found: value.kind_name(),
            }));
        };

        let mut builder = Builder {
            nodes: Vec::new(),
            config,
        };
        let root = builder.build(data, None, None, None)?;
        let paths = PathIndex::build(&builder.nodes, root);
        debug!(
            nodes = builder.nodes.len(),
            types = paths.len(),
            "element tree built"
        );

        Ok(Self {
            nodes: builder.nodes,
            root,
            paths,
        })
    }

    /// The document wrapper node
    #[allow(clippy::indexing_slicing)]
    pub fn root(&self) -> NodeRef<'_> {
        // the builder always pushes the root first
        NodeRef {
            tree: self,
            id: self.root,
            node: &self.nodes[self.root.0],
        }
    }

    /// The node stored under `id`, if it belongs to this tree
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.nodes.get(id.0).map(|node| NodeRef {
            tree: self,
            id,
            node,
        })
    }

    /// Element type to traversal paths, in first-encounter order
    pub fn paths(&self) -> &PathIndex {
        &self.paths
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in depth-first pre-order, starting at the root
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> {
        let mut stack = vec![self.root()];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            let mut children: Vec<_> = node.children().collect();
            children.reverse();
            stack.extend(children);
            Some(node)
        })
    }

    /// Indented description of every node, for debug output
    pub fn dump(&self) -> String {
        let mut out = String::new();
        dump_node(self.root(), 0, &mut out);
        out
    }
}

fn dump_node(node: NodeRef<'_>, depth: usize, out: &mut String) {
    let tabs = "\t".repeat(depth);
    let index = node.index().map(|i| format!("[{i}]")).unwrap_or_default();
    let attrs: Vec<String> = node.attributes().iter().map(ToString::to_string).collect();

    let _ = writeln!(out, "{tabs}{}", "-".repeat(80));
    let _ = writeln!(out, "{tabs}TYPE: {}{index} --> NAME: {}", node.kind(), node.name());
    let _ = writeln!(out, "{tabs}XPATH: {}", node.xpath_str());
    let _ = writeln!(out, "{tabs}TRAVERSAL PATH: {}", node.traversal_str());
    let _ = writeln!(out, "{tabs}OBJECT PATH: {}", node.object_path_str());
    let _ = writeln!(out, "{tabs}ATTRS: {}", attrs.join(","));
    for child in node.children() {
        dump_node(child, depth + 1, out);
    }
}

/// Borrowed view of one node together with its tree
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a ElementTree,
    id: NodeId,
    node: &'a ElementNode,
}

impl<'a> NodeRef<'a> {
    /// Arena handle of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Tree that owns this node
    pub fn tree(&self) -> &'a ElementTree {
        self.tree
    }

    /// The underlying node, borrowed for the tree's lifetime
    pub fn node(&self) -> &'a ElementNode {
        self.node
    }

    /// Direct children in document order
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let (tree, node) = (self.tree, self.node);
        node.children.iter().filter_map(move |&id| tree.get(id))
    }

    /// Children whose type equals `kind`, in document order
    pub fn children_of_kind<'k>(&self, kind: &'k str) -> impl Iterator<Item = NodeRef<'a>> + 'k
    where
        'a: 'k,
    {
        self.children().filter(move |child| child.kind() == kind)
    }

    /// Enclosing node; `None` for the root
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node.parent.and_then(|id| self.tree.get(id))
    }

    /// Every leaf at or below this node, depth-first
    pub fn leaves(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<NodeRef<'a>>) {
        if self.is_leaf() {
            out.push(*self);
        } else {
            for child in self.children() {
                child.collect_leaves(out);
            }
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("xpath", &self.xpath_str())
            .finish()
    }
}

impl<'a> Deref for NodeRef<'a> {
    type Target = ElementNode;

    fn deref(&self) -> &Self::Target {
        self.node
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

struct Builder<'c> {
    nodes: Vec<ElementNode>,
    config: &'c TreeConfig,
}

impl Builder<'_> {
    fn build(
        &mut self,
        data: &Object,
        kind: Option<&str>,
        index: Option<usize>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let kind = match kind {
            Some(kind) => kind.to_string(),
            None => data
                .first_key()
                .map(str::to_string)
                .ok_or_else(|| Error::shape(ErrorKind::EmptyMapping))?,
        };

        let name = data.get(&self.config.label_key).map(Value::scalar_text);

        let mut attributes: Vec<Attribute> = data
            .iter()
            .filter(|(key, _)| !key.starts_with(&self.config.attribute_prefix))
            .filter_map(|(key, value)| match value.classify() {
                Entry::Scalar(scalar) => Some(Attribute::new(key.as_str(), scalar.scalar_text())),
                Entry::Element(_) | Entry::Repeated(_) => None,
            })
            .collect();
        attributes.sort();

        let (mut xpath, mut traversal, mut object_path) = match parent
            .and_then(|id| self.nodes.get(id.0))
        {
            Some(parent) => (
                parent.xpath.clone(),
                parent.traversal.clone(),
                parent.object_path.clone(),
            ),
            None => (Vec::new(), Vec::new(), Vec::new()),
        };
        if parent.is_some() {
            xpath.push(ElementNode::xpath_segment(&kind, index));
            traversal.push(kind.clone());
            object_path.push(ElementNode::object_segment(&kind, &attributes));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(ElementNode {
            kind,
            name,
            index,
            attributes,
            children: Vec::new(),
            parent,
            xpath,
            traversal,
            object_path,
        });

        for (key, value) in data {
            match value.classify() {
                Entry::Element(child) => {
                    let child = self.build(child, Some(key), None, Some(id))?;
                    self.attach(id, child);
                }
                Entry::Repeated(members) => {
                    for (i, member) in members.iter().enumerate() {
                        let child = match member.classify() {
                            Entry::Element(child) => self.build(child, Some(key), Some(i), Some(id))?,
                            Entry::Scalar(scalar) => {
                                let data = scalar_member(scalar);
                                self.build(&data, Some(key), Some(i), Some(id))?
                            }
                            Entry::Repeated(_) => {
                                return Err(Error::shape(ErrorKind::NestedList { key: key.clone() }))
                            }
                        };
                        self.attach(id, child);
                    }
                }
                Entry::Scalar(_) => {}
            }
        }

        Ok(id)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
    }
}

/// Mapping for a scalar list member: a leaf holding the value as text
fn scalar_member(scalar: &Value) -> Object {
    let mut data = Object::new();
    if !scalar.is_null() {
        data.insert(TEXT_KEY, scalar.scalar_text());
    }
    data
}
