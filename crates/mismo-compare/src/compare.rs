//! Comparing two documents element type by element type

use std::fmt;

use tracing::{error, info, instrument, warn};

use crate::locate::locate;
use crate::matching::{pair, MatchTable};
use crate::tree::ElementTree;

/// Element types compared when the caller does not choose any
pub const DEFAULT_TAGS: [&str; 6] = [
    "ASSET",
    "COLLATERAL",
    "EXPENSE",
    "LIABILITY",
    "LOAN",
    "PARTY",
];

/// A requested type that the primary document does not contain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownType {
    pub requested: String,
    /// Types the primary document does contain, sorted
    pub known: Vec<String>,
}

impl fmt::Display for UnknownType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "element '{}' not found in the primary document; available elements: {}",
            self.requested,
            self.known.join(", ")
        )
    }
}

/// Result of comparing one element type
#[derive(Clone, Debug)]
pub struct TagComparison<'a> {
    pub tag: String,
    pub table: MatchTable<'a>,
    /// Set when the primary document has no element of this type; the table is then empty
    pub unknown: Option<UnknownType>,
}

impl TagComparison<'_> {
    pub fn is_unknown_type(&self) -> bool {
        self.unknown.is_some()
    }
}

/// Which document an element type was found in
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Side {
    Primary,
    Basis,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "PRIMARY"),
            Self::Basis => write!(f, "BASIS"),
        }
    }
}

/// An element type present in only one of the two documents
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDifference {
    pub side: Side,
    pub kind: String,
    pub paths: Vec<String>,
}

/// A primary document paired with its basis ("source of truth")
#[derive(Clone, Copy, Debug)]
pub struct Comparison<'a> {
    primary: &'a ElementTree,
    basis: &'a ElementTree,
}

impl<'a> Comparison<'a> {
    pub fn new(primary: &'a ElementTree, basis: &'a ElementTree) -> Self {
        Self { primary, basis }
    }

    pub fn primary(&self) -> &'a ElementTree {
        self.primary
    }

    pub fn basis(&self) -> &'a ElementTree {
        self.basis
    }

    /// Pair every `tag` element of the primary document with the basis document
    #[instrument(skip(self))]
    pub fn compare(&self, tag: &str) -> TagComparison<'a> {
        let Some(sources) = locate(self.primary, tag) else {
            let unknown = UnknownType {
                requested: tag.to_string(),
                known: self.primary.paths().sorted_types(),
            };
            error!("{unknown}");
            return TagComparison {
                tag: tag.to_string(),
                table: MatchTable::default(),
                unknown: Some(unknown),
            };
        };

        let candidates = locate(self.basis, tag).unwrap_or_default();
        if candidates.is_empty() {
            warn!(tag, "element not found in the basis document");
        }
        info!(
            tag,
            primary = sources.len(),
            basis = candidates.len(),
            "comparing element"
        );

        let table = pair(&sources, &candidates);
        info!(
            tag,
            exact = table.exact_count(),
            total = table.len(),
            "comparison finished"
        );

        TagComparison {
            tag: tag.to_string(),
            table,
            unknown: None,
        }
    }

    /// [`compare`](Self::compare) each tag in order
    pub fn compare_all<'t>(&self, tags: impl IntoIterator<Item = &'t str>) -> Vec<TagComparison<'a>> {
        tags.into_iter().map(|tag| self.compare(tag)).collect()
    }

    /// Element types found in exactly one document, sorted by type
    pub fn symmetric_differences(&self) -> Vec<TypeDifference> {
        let primary = self.primary.paths();
        let basis = self.basis.paths();

        let mut diffs: Vec<TypeDifference> = primary
            .iter()
            .filter(|(kind, _)| !basis.contains(kind))
            .map(|(kind, paths)| (Side::Primary, kind, paths))
            .chain(
                basis
                    .iter()
                    .filter(|(kind, _)| !primary.contains(kind))
                    .map(|(kind, paths)| (Side::Basis, kind, paths)),
            )
            .map(|(side, kind, paths)| TypeDifference {
                side,
                kind: kind.to_string(),
                paths: paths.iter().cloned().collect(),
            })
            .collect();
        diffs.sort_by(|a, b| a.kind.cmp(&b.kind));
        diffs
    }
}
