//! Facts: atomic (location, field) observations below a node

use std::collections::BTreeSet;
use std::fmt;

use crate::tree::{Attribute, NodeRef, OBJ_PATH_DELIMITER};

/// One leaf location and at most one of its fields
///
/// Displays as `path|key:value`, or just `path` for a leaf without attributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fact {
    /// Traversal path of the leaf
    pub path: String,
    pub field: Option<Attribute>,
}

impl Fact {
    /// The fact with its value dropped: what could have matched
    pub fn location(&self) -> (&str, Option<&str>) {
        (
            self.path.as_str(),
            self.field.as_ref().map(|attr| attr.key.as_str()),
        )
    }

    pub fn value(&self) -> Option<&str> {
        self.field.as_ref().map(|attr| attr.value.as_str())
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(attr) => write!(f, "{}{OBJ_PATH_DELIMITER}{attr}", self.path),
            None => write!(f, "{}", self.path),
        }
    }
}

pub type FactSet = BTreeSet<Fact>;

/// Split each leaf's object path into one fact per attribute
pub fn expand(leaves: &[NodeRef<'_>]) -> FactSet {
    let mut facts = FactSet::new();
    for leaf in leaves {
        let path = leaf.traversal_str();
        if leaf.attributes().is_empty() {
            facts.insert(Fact { path, field: None });
            continue;
        }
        for attr in leaf.attributes() {
            facts.insert(Fact {
                path: path.clone(),
                field: Some(attr.clone()),
            });
        }
    }
    facts
}

/// Expanded facts of every leaf at or below `node`, plus the scalar fields
/// of each intermediate element strictly between `node` and those leaves
///
/// The fields of `node` itself are left out; `compatible` already requires
/// them to be equal.
pub fn leaf_facts(node: NodeRef<'_>) -> FactSet {
    let mut facts = expand(&node.leaves());
    if !node.is_leaf() {
        for child in node.children() {
            collect_intermediate(child, &mut facts);
        }
    }
    facts
}

fn collect_intermediate(node: NodeRef<'_>, facts: &mut FactSet) {
    if node.is_leaf() {
        return;
    }
    let path = node.traversal_str();
    for attr in node.attributes() {
        facts.insert(Fact {
            path: path.clone(),
            field: Some(attr.clone()),
        });
    }
    for child in node.children() {
        collect_intermediate(child, facts);
    }
}

/// Number of distinct (path, field key) locations across both sets
pub fn unique_location_count(a: &FactSet, b: &FactSet) -> usize {
    a.iter()
        .chain(b.iter())
        .map(Fact::location)
        .collect::<BTreeSet<_>>()
        .len()
}
