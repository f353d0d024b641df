//! Pairing nodes of one element type across the primary and basis trees
//!
//! Pairing is a single greedy pass. Each primary node scans the basis nodes in
//! order, skipping those already taken by an exact match and those whose shape
//! differs ([`compatible`]). The first candidate whose facts equal the
//! primary node's is its exact match and is consumed. Otherwise the candidate
//! sharing the most facts is kept as the closest match; earlier
//! candidates win ties, and closest matches are not consumed.

pub mod diff;
pub mod facts;

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::tree::{NodeId, NodeRef};

pub use diff::{diff_nodes, differences, Difference};
pub use facts::{expand, leaf_facts, unique_location_count, Fact, FactSet};

/// `closest_score` of a record that found an exact match
pub const EXACT_SCORE: i64 = -1;

/// Outcome of pairing one primary node
#[derive(Clone, Debug)]
pub struct MatchRecord<'a> {
    source: NodeRef<'a>,
    exact_match: Option<NodeRef<'a>>,
    closest_candidate: Option<NodeRef<'a>>,
    closest_score: i64,
    total_comparable: usize,
}

/// Summary of a [`MatchRecord`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict<'a> {
    Exact(NodeRef<'a>),
    Closest {
        candidate: NodeRef<'a>,
        score: usize,
        total: usize,
    },
    Unmatched,
}

impl<'a> MatchRecord<'a> {
    fn new(source: NodeRef<'a>) -> Self {
        Self {
            source,
            exact_match: None,
            closest_candidate: None,
            closest_score: 0,
            total_comparable: 0,
        }
    }

    pub fn source(&self) -> NodeRef<'a> {
        self.source
    }

    pub fn exact_match(&self) -> Option<NodeRef<'a>> {
        self.exact_match
    }

    pub fn closest_candidate(&self) -> Option<NodeRef<'a>> {
        self.closest_candidate
    }

    /// Shared leaf facts with the closest candidate; [`EXACT_SCORE`] for exact matches
    pub fn closest_score(&self) -> i64 {
        self.closest_score
    }

    /// Distinct (location, field) pairs across the source and its match
    pub fn total_comparable(&self) -> usize {
        self.total_comparable
    }

    pub fn is_exact(&self) -> bool {
        self.exact_match.is_some()
    }

    pub fn verdict(&self) -> Verdict<'a> {
        match (self.exact_match, self.closest_candidate) {
            (Some(exact), _) => Verdict::Exact(exact),
            (None, Some(candidate)) => Verdict::Closest {
                candidate,
                score: usize::try_from(self.closest_score).unwrap_or_default(),
                total: self.total_comparable,
            },
            (None, None) => Verdict::Unmatched,
        }
    }

    /// Locations that did not match the closest candidate
    ///
    /// The score counts shared facts while the total counts distinct
    /// (path, field) locations. Leaves repeated under one traversal path put
    /// several facts at a single location, so the score can exceed the total;
    /// the count is then the absolute difference between the two.
    pub fn differences_count(&self) -> Option<usize> {
        match self.verdict() {
            Verdict::Closest { score, total, .. } => Some(total.abs_diff(score)),
            Verdict::Exact(_) | Verdict::Unmatched => None,
        }
    }
}

/// Match records keyed by the primary node's xpath, in primary order
#[derive(Clone, Debug, Default)]
pub struct MatchTable<'a>(IndexMap<String, MatchRecord<'a>>);

impl<'a> MatchTable<'a> {
    pub fn get(&self, xpath: &str) -> Option<&MatchRecord<'a>> {
        self.0.get(xpath)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatchRecord<'a>)> {
        self.0.iter().map(|(xpath, record)| (xpath.as_str(), record))
    }

    pub fn records(&self) -> impl Iterator<Item = &MatchRecord<'a>> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn exact_count(&self) -> usize {
        self.records().filter(|record| record.is_exact()).count()
    }
}

impl<'t, 'a> IntoIterator for &'t MatchTable<'a> {
    type Item = (&'t String, &'t MatchRecord<'a>);
    type IntoIter = indexmap::map::Iter<'t, String, MatchRecord<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Same attributes and the same multiset of child types
///
/// Values below the direct children are not looked at.
pub fn compatible(a: NodeRef<'_>, b: NodeRef<'_>) -> bool {
    if a.attributes() != b.attributes() || a.child_ids().len() != b.child_ids().len() {
        return false;
    }
    let mut a_kinds: Vec<&str> = a.children().map(|child| child.node().kind()).collect();
    let mut b_kinds: Vec<&str> = b.children().map(|child| child.node().kind()).collect();
    a_kinds.sort_unstable();
    b_kinds.sort_unstable();
    a_kinds == b_kinds
}

/// Pair every primary node with at most one exact or closest basis node
pub fn pair<'a>(primary: &[NodeRef<'a>], basis: &[NodeRef<'a>]) -> MatchTable<'a> {
    debug!(
        primary = ?primary.iter().map(|n| n.xpath_str()).collect::<Vec<_>>(),
        basis = ?basis.iter().map(|n| n.xpath_str()).collect::<Vec<_>>(),
        "pairing"
    );

    let mut table = IndexMap::with_capacity(primary.len());
    let mut consumed: HashSet<NodeId> = HashSet::new();
    let mut basis_facts: Vec<Option<FactSet>> = vec![None; basis.len()];

    for &source in primary {
        let mut record = MatchRecord::new(source);
        let mut source_facts: Option<FactSet> = None;

        for (&candidate, cached) in basis.iter().zip(basis_facts.iter_mut()) {
            if consumed.contains(&candidate.id()) {
                debug!(candidate = %candidate.xpath_str(), "already matched");
                continue;
            }
            if !compatible(source, candidate) {
                debug!(
                    source = %source.xpath_str(),
                    candidate = %candidate.xpath_str(),
                    "attributes or child types differ"
                );
                continue;
            }

            let s_facts = source_facts.get_or_insert_with(|| leaf_facts(source));
            let c_facts = cached.get_or_insert_with(|| leaf_facts(candidate));
            let total = unique_location_count(s_facts, c_facts);

            if s_facts == c_facts {
                debug!(
                    source = %source.xpath_str(),
                    candidate = %candidate.xpath_str(),
                    "exact match"
                );
                record.exact_match = Some(candidate);
                record.closest_candidate = None;
                record.closest_score = EXACT_SCORE;
                record.total_comparable = total;
                consumed.insert(candidate.id());
                break;
            }

            let score = i64::try_from(s_facts.intersection(c_facts).count()).unwrap_or(i64::MAX);
            debug!(
                source = %source.xpath_str(),
                candidate = %candidate.xpath_str(),
                score,
                total,
                "partial match"
            );
            if score > record.closest_score {
                record.closest_candidate = Some(candidate);
                record.closest_score = score;
                record.total_comparable = total;
            }
        }

        log_record(&record);
        table.insert(source.xpath_str(), record);
    }

    MatchTable(table)
}

fn log_record(record: &MatchRecord<'_>) {
    let source = record.source.xpath_str();
    match record.verdict() {
        Verdict::Exact(exact) => debug!(%source, exact = %exact.xpath_str(), "paired"),
        Verdict::Closest {
            candidate,
            score,
            total,
        } => debug!(%source, closest = %candidate.xpath_str(), score, total, "paired"),
        Verdict::Unmatched => debug!(%source, "no candidate"),
    }
}
