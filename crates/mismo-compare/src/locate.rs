//! Locating every node of one element type

use tracing::debug;

use crate::tree::{ElementTree, NodeRef, XPATH_DELIMITER};

/// Every node of type `kind` in `tree`
///
/// Paths come from the tree's [`PathIndex`](crate::tree::PathIndex); each is
/// walked depth-first from the root and the results are concatenated in index
/// order. Returns `None` when the type does not occur in the tree.
pub fn locate<'a>(tree: &'a ElementTree, kind: &str) -> Option<Vec<NodeRef<'a>>> {
    let paths = tree.paths().get(kind)?;
    debug!(kind, paths = ?paths, "traversal paths");

    let mut found = Vec::new();
    for path in paths {
        let segments: Vec<&str> = path.split(XPATH_DELIMITER).collect();
        walk(tree.root(), &segments, &mut found);
    }
    debug!(kind, found = found.len(), "located elements");
    Some(found)
}

fn walk<'a>(node: NodeRef<'a>, segments: &[&str], found: &mut Vec<NodeRef<'a>>) {
    let Some((&next, rest)) = segments.split_first() else {
        return;
    };
    for child in node.children_of_kind(next) {
        if rest.is_empty() {
            found.push(child);
        } else {
            walk(child, rest, found);
        }
    }
}
