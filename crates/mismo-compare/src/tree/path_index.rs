//! Element type to traversal path index

use indexmap::{IndexMap, IndexSet};

use crate::tree::node::{ElementNode, NodeId};

/// Maps every element type in a tree to the distinct traversal paths reaching it
///
/// Types and paths keep first-encounter (document) order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathIndex(IndexMap<String, IndexSet<String>>);

impl PathIndex {
    /// Walk the subtree below `root` and record each node's traversal path
    ///
    /// The root itself is the document wrapper and is not recorded.
    pub(crate) fn build(nodes: &[ElementNode], root: NodeId) -> Self {
        let mut acc = IndexMap::new();
        if let Some(node) = nodes.get(root.0) {
            for &child in &node.children {
                collect(nodes, child, &mut acc);
            }
        }
        Self(acc)
    }

    /// Traversal paths for `kind`, or `None` if the type never occurs
    pub fn get(&self, kind: &str) -> Option<&IndexSet<String>> {
        self.0.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.0.contains_key(kind)
    }

    /// Known element types in first-encounter order
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Known element types, sorted
    pub fn sorted_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.0.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.0.iter().map(|(kind, paths)| (kind.as_str(), paths))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn collect(nodes: &[ElementNode], id: NodeId, acc: &mut IndexMap<String, IndexSet<String>>) {
    let Some(node) = nodes.get(id.0) else {
        return;
    };
    acc.entry(node.kind.clone())
        .or_default()
        .insert(node.traversal_str());
    for &child in &node.children {
        collect(nodes, child, acc);
    }
}
