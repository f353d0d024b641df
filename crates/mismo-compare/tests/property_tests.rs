//! Property-based tests for the tree model and pairing
//!
//! These tests use proptest to verify:
//! 1. Every xpath is unique within its tree
//! 2. Object paths reduce to traversal paths once attributes are stripped
//! 3. `locate` keeps depth-first order for each traversal path
//! 4. Pairing is repeatable and a tree always matches itself exactly

use std::collections::HashSet;

use mismo_compare::tree::{OBJ_PATH_DELIMITER, XPATH_DELIMITER};
use mismo_compare::{
    leaf_facts, locate, pair, unique_location_count, ElementTree, Object, Value, EXACT_SCORE,
};
use proptest::prelude::*;

/// Element names, kept tiny so types repeat across paths
fn arb_key() -> impl Strategy<Value = String> + Clone {
    "[A-D]".prop_map(|s| s)
}

/// Nested mappings whose lists only ever hold mappings
fn arb_element() -> impl Strategy<Value = Value> {
    let leaf = "[a-z]{0,3}".prop_map(Value::from);

    leaf.prop_recursive(5, 64, 4, |inner| {
        let object = prop::collection::vec((arb_key(), inner), 0..4)
            .prop_map(|entries| Value::Object(entries.into_iter().collect::<Object>()));
        prop_oneof![
            object.clone(),
            prop::collection::vec(object, 1..4).prop_map(Value::from),
        ]
    })
}

fn arb_tree() -> impl Strategy<Value = ElementTree> {
    arb_element().prop_filter_map("document must build", |body| {
        ElementTree::from_value(&Value::Object(Object::from([("ROOT", body)]))).ok()
    })
}

proptest! {
    #[test]
    fn xpath_is_unique(tree in arb_tree()) {
        let xpaths: HashSet<String> = tree.iter().map(|n| n.xpath_str()).collect();
        prop_assert_eq!(xpaths.len(), tree.len());
    }

    #[test]
    fn object_path_strips_to_traversal(tree in arb_tree()) {
        for node in tree.iter() {
            prop_assert!(node.traversal().len() <= node.object_path().len());
            let stripped: Vec<&str> = node
                .object_path()
                .iter()
                .map(|segment| segment.split(OBJ_PATH_DELIMITER).next().unwrap_or_default())
                .collect();
            prop_assert_eq!(stripped.join(XPATH_DELIMITER), node.traversal_str());
        }
    }

    #[test]
    fn locate_follows_depth_first_order(tree in arb_tree()) {
        let root = tree.root().id();
        for (kind, paths) in tree.paths().iter() {
            let found = locate(&tree, kind).unwrap_or_default();

            let expected: Vec<String> = paths
                .iter()
                .flat_map(|path| {
                    tree.iter()
                        .filter(move |n| n.id() != root && n.kind() == kind && n.traversal_str() == *path)
                        .map(|n| n.xpath_str())
                })
                .collect();
            let actual: Vec<String> = found.iter().map(|n| n.xpath_str()).collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn pairing_is_idempotent(a in arb_tree(), b in arb_tree()) {
        for kind in a.paths().types() {
            let sources = locate(&a, kind).unwrap_or_default();
            let candidates = locate(&b, kind).unwrap_or_default();
            let first = format!("{:?}", pair(&sources, &candidates));
            let second = format!("{:?}", pair(&sources, &candidates));
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn tree_matches_itself(tree in arb_tree()) {
        for kind in tree.paths().types() {
            let nodes = locate(&tree, kind).unwrap_or_default();
            let table = pair(&nodes, &nodes);
            prop_assert_eq!(table.len(), nodes.len());
            for record in table.records() {
                prop_assert!(record.is_exact());
                prop_assert_eq!(record.closest_score(), EXACT_SCORE);
                let facts = leaf_facts(record.source());
                prop_assert_eq!(record.total_comparable(), unique_location_count(&facts, &facts));
            }
        }
    }
}
