//! XSD-like schema derivation from an element tree or a structured value
//!
//! The schema describes shape only: complex types with a sequence for
//! branches, `xs:string` for every leaf. A repeated child name is declared
//! once with `maxOccurs="unbounded"`; its shape comes from the first
//! occurrence unless [`SchemaOptions::merge_repeated`] is set.
//! Attributes are never declared.

use std::fmt;

use tracing::debug;

use crate::config::SchemaOptions;
use crate::error::{Error, ErrorKind, Result, Span};
use crate::structured::{FieldValue, StructuredValue};
use crate::value::Value;
use crate::xml::model::Element;

/// Namespace bound to the `xs` prefix in schema documents
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

const SIMPLE_STRING: &str =
    "<xs:simpleType>\n<xs:restriction base=\"xs:string\" />\n</xs:simpleType>\n";

/// Derived schema: one root declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaDescription {
    pub root: SchemaElement,
}

/// Element declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaElement {
    pub name: String,
    /// Declared with `maxOccurs="unbounded"`
    pub repeatable: bool,
    pub kind: SchemaType,
}

/// Content type of a declaration
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaType {
    /// `xs:complexType` with an `xs:sequence` of members
    Complex(Vec<SchemaElement>),
    /// Inline `xs:simpleType` restricted to `xs:string`
    Simple,
    /// `type="xs:string"` on the declaration itself
    String,
}

/// What a schema is derived from
#[derive(Clone, Copy, Debug)]
pub enum SchemaSource<'a> {
    Element(&'a Element),
    Structured {
        value: &'a StructuredValue,
        root_name: &'a str,
    },
    Json {
        value: &'a Value,
        root_name: &'a str,
    },
}

/// Derive a schema from any supported source
pub fn derive_schema(source: SchemaSource<'_>, options: &SchemaOptions) -> SchemaDescription {
    match source {
        SchemaSource::Element(element) => derive_from_element(element, options),
        SchemaSource::Structured { value, root_name } => {
            derive_from_structured(value, root_name, options)
        }
        SchemaSource::Json { value, root_name } => derive_from_json(value, root_name, options),
    }
}

/// Derive from an element tree; attributes and text are not described
pub fn derive_from_element(element: &Element, options: &SchemaOptions) -> SchemaDescription {
    debug!(root = %element.name, merge = options.merge_repeated, "deriving schema from element");
    SchemaDescription {
        root: SchemaElement {
            name: element.name.clone(),
            repeatable: false,
            kind: element_kind(element, options),
        },
    }
}

fn element_kind(element: &Element, options: &SchemaOptions) -> SchemaType {
    if !element.has_children() {
        return SchemaType::Simple;
    }

    // group children by name, first-seen order
    let mut groups: Vec<(&str, Vec<&Element>)> = Vec::new();
    for child in element.child_elements() {
        match groups.iter_mut().find(|(name, _)| *name == child.name) {
            Some((_, items)) => items.push(child),
            None => groups.push((child.name.as_str(), vec![child])),
        }
    }

    let members = groups
        .into_iter()
        .map(|(name, items)| SchemaElement {
            name: name.to_string(),
            repeatable: items.len() > 1,
            kind: fold_kinds(items.into_iter().map(|item| element_kind(item, options)), options),
        })
        .collect();
    SchemaType::Complex(members)
}

/// Derive from a plain-dict structured value
pub fn derive_from_structured(
    value: &StructuredValue,
    root_name: &str,
    options: &SchemaOptions,
) -> SchemaDescription {
    debug!(root = root_name, "deriving schema from structured value");
    SchemaDescription {
        root: SchemaElement {
            name: root_name.to_string(),
            repeatable: false,
            kind: structured_kind(value, options),
        },
    }
}

fn structured_kind(value: &StructuredValue, options: &SchemaOptions) -> SchemaType {
    match value {
        StructuredValue::Leaf(_) => SchemaType::Simple,
        StructuredValue::Branch(fields) => SchemaType::Complex(
            fields
                .iter()
                .map(|(name, field)| SchemaElement {
                    name: name.clone(),
                    repeatable: matches!(field, FieldValue::Many(_)),
                    kind: fold_kinds(
                        field.items().iter().map(|item| structured_kind(item, options)),
                        options,
                    ),
                })
                .collect(),
        ),
    }
}

/// Derive from a JSON-variant value; the reserved text key is skipped
pub fn derive_from_json(value: &Value, root_name: &str, options: &SchemaOptions) -> SchemaDescription {
    debug!(root = root_name, "deriving schema from json value");
    SchemaDescription {
        root: SchemaElement {
            name: root_name.to_string(),
            repeatable: false,
            kind: json_kind(value, options),
        },
    }
}

fn json_kind(value: &Value, options: &SchemaOptions) -> SchemaType {
    let Value::Object(obj) = value else {
        return SchemaType::Simple;
    };

    let members = obj
        .iter()
        .filter(|(key, _)| **key != options.text_key)
        .map(|(key, field)| match field {
            Value::Array(items) if items.is_empty() => SchemaElement {
                name: key.clone(),
                repeatable: true,
                kind: SchemaType::String,
            },
            Value::Array(items) => SchemaElement {
                name: key.clone(),
                repeatable: true,
                kind: fold_kinds(items.iter().map(|item| json_kind(item, options)), options),
            },
            Value::Object(_) => SchemaElement {
                name: key.clone(),
                repeatable: false,
                kind: json_kind(field, options),
            },
            _ => SchemaElement {
                name: key.clone(),
                repeatable: false,
                kind: SchemaType::String,
            },
        })
        .collect();
    SchemaType::Complex(members)
}

/// Shape of a repeated member: the first item's, or all items merged
fn fold_kinds(mut kinds: impl Iterator<Item = SchemaType>, options: &SchemaOptions) -> SchemaType {
    let first = kinds.next().unwrap_or(SchemaType::String);
    if !options.merge_repeated {
        return first;
    }
    kinds.fold(first, merge_kinds)
}

fn merge_kinds(left: SchemaType, right: SchemaType) -> SchemaType {
    match (left, right) {
        (SchemaType::Complex(mut members), SchemaType::Complex(others)) => {
            for other in others {
                match members.iter_mut().find(|member| member.name == other.name) {
                    Some(member) => {
                        member.repeatable |= other.repeatable;
                        let kind = std::mem::replace(&mut member.kind, SchemaType::String);
                        member.kind = merge_kinds(kind, other.kind);
                    }
                    None => members.push(other),
                }
            }
            SchemaType::Complex(members)
        }
        (complex @ SchemaType::Complex(_), _) | (_, complex @ SchemaType::Complex(_)) => complex,
        (SchemaType::Simple, _) | (_, SchemaType::Simple) => SchemaType::Simple,
        (SchemaType::String, SchemaType::String) => SchemaType::String,
    }
}

impl SchemaDescription {
    /// The root declaration as text, without the schema document wrapper
    pub fn to_xsd(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("<xs:element name=\"{}\">\n", self.root.name));
        match &self.root.kind {
            SchemaType::Complex(members) => write_complex(members, &mut output),
            SchemaType::Simple | SchemaType::String => output.push_str(SIMPLE_STRING),
        }
        output.push_str("</xs:element>");
        output
    }

    /// Complete schema document, as written to `.xsd` files
    pub fn to_document(&self) -> String {
        wrap_document(&self.to_xsd())
    }

    /// Check that `element` has the shape this schema declares.
    ///
    /// Children follow the declared order. A member occurs at least once,
    /// and only repeatable members more than once. Leaf declarations admit
    /// no child elements. Attributes and text are not checked.
    pub fn validate(&self, element: &Element) -> Result<()> {
        if element.name != self.root.name {
            return Err(violation(
                &element.name,
                format!("expected root <{}>, found <{}>", self.root.name, element.name),
            ));
        }
        validate_kind(&self.root.kind, element, &element.name)?;
        debug!(root = %element.name, "element matches schema");
        Ok(())
    }

    /// Member declarations of the root, if it is complex
    pub fn members(&self) -> &[SchemaElement] {
        match &self.root.kind {
            SchemaType::Complex(members) => members,
            SchemaType::Simple | SchemaType::String => &[],
        }
    }
}

impl fmt::Display for SchemaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xsd())
    }
}

impl SchemaElement {
    /// Member declaration by name, for complex declarations
    pub fn member(&self, name: &str) -> Option<&Self> {
        match &self.kind {
            SchemaType::Complex(members) => members.iter().find(|member| member.name == name),
            SchemaType::Simple | SchemaType::String => None,
        }
    }
}

fn validate_kind(kind: &SchemaType, element: &Element, path: &str) -> Result<()> {
    let SchemaType::Complex(members) = kind else {
        return match element.child_elements().next() {
            Some(child) => Err(violation(
                &format!("{path}/{}", child.name),
                format!("<{}> holds text only, found child <{}>", element.name, child.name),
            )),
            None => Ok(()),
        };
    };

    let mut children = element.child_elements().peekable();
    for member in members {
        let member_path = format!("{path}/{}", member.name);
        let mut count = 0usize;
        while let Some(child) = children.next_if(|child| child.name == member.name) {
            count += 1;
            if count > 1 && !member.repeatable {
                return Err(violation(
                    &member_path,
                    format!("<{}> may occur only once", member.name),
                ));
            }
            validate_kind(&member.kind, child, &member_path)?;
        }
        if count == 0 {
            return Err(violation(&member_path, format!("missing <{}>", member.name)));
        }
    }

    match children.next() {
        Some(child) => Err(violation(
            &format!("{path}/{}", child.name),
            format!("unexpected <{}> in <{}>", child.name, element.name),
        )),
        None => Ok(()),
    }
}

fn violation(path: &str, message: String) -> Error {
    Error::with_message(
        ErrorKind::SchemaViolation {
            path: path.to_string(),
        },
        Span::empty(),
        message,
    )
}

/// Wrap a root declaration in the schema document element
pub fn wrap_document(xsd: &str) -> String {
    format!("<xs:schema xmlns:xs=\"{XSD_NAMESPACE}\">\n{xsd}</xs:schema>")
}

fn write_complex(members: &[SchemaElement], output: &mut String) {
    output.push_str("<xs:complexType>\n<xs:sequence>\n");
    for member in members {
        write_member(member, output);
    }
    output.push_str("</xs:sequence>\n</xs:complexType>\n");
}

fn write_member(member: &SchemaElement, output: &mut String) {
    output.push_str("<xs:element name=\"");
    output.push_str(&member.name);
    output.push('"');
    if member.repeatable {
        output.push_str(" maxOccurs=\"unbounded\"");
    }
    match &member.kind {
        SchemaType::String => output.push_str(" type=\"xs:string\" />\n"),
        SchemaType::Simple => {
            output.push_str(">\n");
            output.push_str(SIMPLE_STRING);
            output.push_str("</xs:element>\n");
        }
        SchemaType::Complex(members) => {
            output.push_str(">\n");
            write_complex(members, output);
            output.push_str("</xs:element>\n");
        }
    }
}
