//! Per-field differences between a primary node and its closest candidate

use std::collections::BTreeMap;

use crate::matching::facts::{leaf_facts, FactSet};
use crate::matching::MatchRecord;
use crate::tree::NodeRef;

/// Values observed at one fact location on both sides
///
/// `None` means the side has no entry there. A leaf without attributes that
/// is present reports an empty value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Difference {
    pub path: String,
    pub field: Option<String>,
    pub primary: Option<String>,
    pub basis: Option<String>,
}

impl Difference {
    pub fn differs(&self) -> bool {
        self.primary != self.basis
    }
}

/// Differences between a record's source and its closest candidate
///
/// Empty for exact matches and unmatched records.
pub fn differences(record: &MatchRecord<'_>) -> Vec<Difference> {
    match (record.exact_match(), record.closest_candidate()) {
        (None, Some(candidate)) => diff_nodes(record.source(), candidate),
        _ => Vec::new(),
    }
}

/// Every fact location of either node with the values each side holds there,
/// sorted by path and field
pub fn diff_nodes(primary: NodeRef<'_>, basis: NodeRef<'_>) -> Vec<Difference> {
    let mut rows: BTreeMap<(String, Option<String>), (Vec<String>, Vec<String>)> = BTreeMap::new();

    let mut collect_side = |facts: FactSet, primary_side: bool| {
        for fact in facts {
            let value = fact.value().unwrap_or_default().to_string();
            let (path, key) = fact.location();
            let entry = rows
                .entry((path.to_string(), key.map(str::to_string)))
                .or_default();
            if primary_side {
                entry.0.push(value);
            } else {
                entry.1.push(value);
            }
        }
    };
    collect_side(leaf_facts(primary), true);
    collect_side(leaf_facts(basis), false);

    rows.into_iter()
        .map(|((path, field), (primary, basis))| Difference {
            path,
            field,
            primary: join_values(primary),
            basis: join_values(basis),
        })
        .collect()
}

// repeated leaves can hold several values at one location
fn join_values(values: Vec<String>) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}
