//! Conversion of an XML document into the nested mapping the tree model consumes
//!
//! The conventions are the usual xml-to-dict ones:
//! - the result is a single-key mapping `{root_name: root_value}`
//! - XML attributes become keys prefixed with [`ATTRIBUTE_PREFIX`]
//! - character data of an element with attributes or children goes under [`TEXT_KEY`]
//! - an element holding only text becomes a string, an empty element becomes null
//! - siblings sharing a name collapse into a list at the first sibling's position

use crate::value::{Array, Object, Value};
use crate::xml::model::{Document, Element};

/// Prefix marking keys that came from XML attributes
pub const ATTRIBUTE_PREFIX: &str = "@";

/// Key holding character data of mixed-content elements
pub const TEXT_KEY: &str = "#text";

/// Convert a parsed document into its nested mapping
pub fn to_value(doc: &Document) -> Value {
    let mut root = Object::new();
    root.insert(doc.root.name.clone(), element_value(&doc.root));
    Value::Object(root)
}

fn element_value(element: &Element) -> Value {
    let text = element.text();
    let text = text.trim();

    if element.attributes.is_empty() && element.elements().next().is_none() {
        return if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.to_string())
        };
    }

    let mut obj = Object::new();
    for (key, value) in &element.attributes {
        obj.insert(format!("{ATTRIBUTE_PREFIX}{key}"), value.as_str());
    }

    for child in element.elements() {
        let value = element_value(child);
        match obj.get_mut(&child.name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Value::Array(Array::from(vec![first, value]));
            }
            None => {
                obj.insert(child.name.clone(), value);
            }
        }
    }

    if !text.is_empty() {
        obj.insert(TEXT_KEY, text);
    }

    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::xml::Parser;

    fn convert(input: &str) -> Result<Value> {
        let doc = Parser::new(input.as_bytes()).parse()?;
        Ok(to_value(&doc))
    }

    #[test]
    fn test_text_only_element_becomes_string() -> Result<()> {
        let value = convert("<PARTY><NAME> John </NAME><EMPTY/></PARTY>")?;
        assert_eq!(
            value.to_json(),
            r#"{"PARTY":{"NAME":"John","EMPTY":null}}"#
        );
        Ok(())
    }

    #[test]
    fn test_attributes_are_prefixed() -> Result<()> {
        let value = convert(r#"<PARTY xlink:label="PARTY_1" SequenceNumber="1">text</PARTY>"#)?;
        assert_eq!(
            value.to_json(),
            r##"{"PARTY":{"@xlink:label":"PARTY_1","@SequenceNumber":"1","#text":"text"}}"##
        );
        Ok(())
    }

    #[test]
    fn test_repeated_siblings_collapse_into_list() -> Result<()> {
        let value = convert("<PARTIES><PARTY><N>a</N></PARTY><X/><PARTY><N>b</N></PARTY><PARTY/></PARTIES>")?;
        assert_eq!(
            value.to_json(),
            r#"{"PARTIES":{"PARTY":[{"N":"a"},{"N":"b"},null],"X":null}}"#
        );
        Ok(())
    }
}
