//! XML document loading

mod cursor;
pub mod mapping;
pub mod model;
pub mod parser;

pub use mapping::{to_value, ATTRIBUTE_PREFIX, TEXT_KEY};
pub use model::{Content, Document, Element};
pub use parser::{Config, Parser};
