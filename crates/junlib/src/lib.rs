//! junlib - XML <-> JSON tree conversion and XSD derivation
//!
//! # Quick Start
//!
//! ```
//! use junlib::{element_to_json, from_xml_str, json_to_element};
//! # fn main() -> Result<(), junlib::Error> {
//! let doc = from_xml_str(r#"<root><person id="1"><name>Hong</name></person></root>"#)?;
//! let value = element_to_json(&doc.root)?;
//! let name = value
//!     .as_object()
//!     .and_then(|obj| obj.get("person"))
//!     .and_then(|person| person.as_object())
//!     .and_then(|person| person.get("name"))
//!     .and_then(|name| name.as_object())
//!     .and_then(|name| name.get("__text__"))
//!     .and_then(|text| text.as_string())
//!     .unwrap_or_default();
//! assert_eq!(name, "Hong");
//!
//! let rebuilt = json_to_element(&value, "root")?;
//! assert_eq!(rebuilt, doc.root);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod config;
pub use config::{
    ConvertOptions, JsonWriteOptions, ParseConfig, SchemaOptions, WriteOptions, DEFAULT_TEXT_KEY,
};

pub mod value;
pub use value::{Array, Object, Value};

pub mod xml;
pub use xml::{AttributeMatch, Content, Document, Element, Parser};

pub mod structured;
pub use structured::{element_to_dict, element_to_structured, FieldValue, Fields, StructuredValue};

pub mod json;
pub use json::{
    element_to_json, element_to_json_with_options, from_json_str, json_to_element,
    json_to_element_with_options, to_json_string, to_json_string_with_options,
};

pub mod schema;
pub use schema::{
    derive_from_element, derive_from_json, derive_from_structured, derive_schema,
    SchemaDescription, SchemaElement, SchemaSource, SchemaType,
};

pub mod io;
pub use io::Loader;

/// Parse XML from string
pub fn from_xml_str(s: &str) -> Result<Document> {
    let mut parser = Parser::new(s.as_bytes());
    parser.parse()
}

/// Parse XML from bytes
pub fn from_xml_bytes(bytes: &[u8]) -> Result<Document> {
    let mut parser = Parser::new(bytes);
    parser.parse()
}

/// Parse XML with custom limits
pub fn from_xml_str_with_config(s: &str, config: ParseConfig) -> Result<Document> {
    let mut parser = Parser::with_config(s.as_bytes(), config);
    parser.parse()
}

/// Serialize an element tree to XML text
pub fn to_xml_string(element: &Element, options: &WriteOptions) -> String {
    xml::writer::to_string(element, options)
}
