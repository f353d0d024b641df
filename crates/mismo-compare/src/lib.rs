//! mismo-compare - structural comparison of MISMO XML documents
//!
//! A document is loaded into an [`ElementTree`], every element of a chosen
//! type is located in both trees, and each primary element is paired with
//! an exact or closest element of the basis document.
//!
//! # Quick Start
//!
//! ```
//! use mismo_compare::{load_str, Comparison};
//! # fn main() -> Result<(), mismo_compare::Error> {
//! let primary = load_str(
//!     "<DEAL><PARTY><NAME><FIRST>John</FIRST><LAST>Smith</LAST></NAME></PARTY></DEAL>",
//! )?;
//! let basis = load_str(
//!     "<DEAL><PARTY><NAME><FIRST>Jon</FIRST><LAST>Smith</LAST></NAME></PARTY></DEAL>",
//! )?;
//!
//! let result = Comparison::new(&primary, &basis).compare("PARTY");
//! let record = result.table.get("/DEAL/PARTY");
//! assert_eq!(record.and_then(|r| r.differences_count()), Some(1));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod value;
pub use value::{Array, Entry, Object, Value};

pub mod xml;
pub use xml::{Config as XmlConfig, Document as XmlDocument, Parser as XmlParser};

pub mod tree;
pub use tree::{Attribute, ElementNode, ElementTree, NodeId, NodeRef, PathIndex, TreeConfig};

pub mod locate;
pub use locate::locate;

pub mod matching;
pub use matching::{
    compatible, diff_nodes, differences, expand, leaf_facts, pair, unique_location_count, Difference,
    Fact, FactSet, MatchRecord, MatchTable, Verdict, EXACT_SCORE,
};

pub mod compare;
pub use compare::{Comparison, Side, TagComparison, TypeDifference, UnknownType, DEFAULT_TAGS};

use tracing::instrument;

/// Load an XML document from a string with default limits
pub fn load_str(s: &str) -> Result<ElementTree> {
    load_bytes(s.as_bytes())
}

/// Load an XML document from bytes with default limits
pub fn load_bytes(bytes: &[u8]) -> Result<ElementTree> {
    load_with_config(bytes, &XmlConfig::default(), &TreeConfig::default())
}

/// Parse XML, map it to a [`Value`] and build the element tree
#[instrument(skip_all, fields(len = bytes.len()))]
pub fn load_with_config(
    bytes: &[u8],
    xml_config: &XmlConfig,
    tree_config: &TreeConfig,
) -> Result<ElementTree> {
    let document = XmlParser::with_config(bytes, *xml_config).parse()?;
    let value = xml::to_value(&document);
    ElementTree::with_config(&value, tree_config)
}

/// Parse XML into its mapping without building a tree
pub fn to_value_str(s: &str) -> Result<Value> {
    let document = XmlParser::new(s.as_bytes()).parse()?;
    Ok(xml::to_value(&document))
}
