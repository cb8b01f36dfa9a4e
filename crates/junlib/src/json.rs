//! JSON variant of the tree conversion, and JSON text input/output
//!
//! Every element maps to an object. The element's own text (trimmed) is kept
//! under a reserved key, attributes become string fields, and child elements
//! become nested objects with repeated names promoted to arrays. The inverse
//! direction rebuilds the element tree from such an object.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::{ConvertOptions, JsonWriteOptions};
use crate::error::{Error, ErrorKind, Result, Span};
use crate::value::{Object, Value};
use crate::xml::model::{Content, Element};
use crate::xml::parser::is_valid_name;

/// Convert an element tree to its JSON-variant value
pub fn element_to_json(element: &Element) -> Result<Value> {
    element_to_json_with_options(element, &ConvertOptions::default())
}

/// Convert an element tree to its JSON-variant value with options
#[instrument(level = "debug", skip_all, fields(root = %element.name))]
pub fn element_to_json_with_options(element: &Element, options: &ConvertOptions) -> Result<Value> {
    element_to_object(element, &options.text_key).map(Value::Object)
}

fn element_to_object(element: &Element, text_key: &str) -> Result<Object> {
    let mut obj = Object::new();

    if let Some(text) = element.text() {
        let text = text.trim();
        if !text.is_empty() {
            obj.insert(text_key, text);
        }
    }

    for (key, value) in element.attributes.iter() {
        if key == text_key {
            return Err(reserved_key(key));
        }
        obj.insert(key, value.clone());
    }

    for child in element.child_elements() {
        if child.name == text_key {
            return Err(reserved_key(&child.name));
        }
        if element.attributes.contains_key(&child.name) {
            return Err(Error::with_message(
                ErrorKind::DuplicateKey {
                    key: child.name.clone(),
                },
                Span::empty(),
                format!(
                    "child <{}> clashes with an attribute of <{}>",
                    child.name, element.name
                ),
            ));
        }

        let value = Value::Object(element_to_object(child, text_key)?);
        match obj.get_mut(&child.name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Value::from(vec![first, value]);
            }
            None => {
                obj.insert(&child.name, value);
            }
        }
    }

    Ok(obj)
}

fn reserved_key(key: &str) -> Error {
    Error::conversion(ErrorKind::ReservedKeyCollision {
        key: key.to_string(),
    })
}

/// Rebuild an element tree from a JSON-variant value
pub fn json_to_element(value: &Value, root_name: &str) -> Result<Element> {
    json_to_element_with_options(value, root_name, &ConvertOptions::default())
}

/// Rebuild an element tree from a JSON-variant value with options.
///
/// A top-level array becomes a `root_name` element holding one `root_name`
/// child per item: the name an array is bound to names its items, at the top
/// level as for nested fields. Field keys must be valid XML names, since
/// they become tag or attribute names.
#[instrument(level = "debug", skip(value, options))]
pub fn json_to_element_with_options(
    value: &Value,
    root_name: &str,
    options: &ConvertOptions,
) -> Result<Element> {
    check_name(root_name)?;
    let mut root = Element::new(root_name);
    match value {
        Value::Array(items) => {
            debug!(items = items.len(), "top-level array");
            for item in items {
                root.children
                    .push(Content::Element(item_to_element(item, root_name, options)?));
            }
        }
        _ => fill_element(&mut root, value, options)?,
    }
    Ok(root)
}

fn item_to_element(item: &Value, name: &str, options: &ConvertOptions) -> Result<Element> {
    if item.is_array() {
        return Err(Error::malformed(format!(
            "array directly inside array for <{name}>"
        )));
    }
    check_name(name)?;
    let mut element = Element::new(name);
    fill_element(&mut element, item, options)?;
    Ok(element)
}

fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::malformed(format!("invalid xml name {name:?}")))
    }
}

fn fill_element(element: &mut Element, value: &Value, options: &ConvertOptions) -> Result<()> {
    match value {
        Value::Object(obj) => {
            for (key, field) in obj.iter() {
                if *key == options.text_key {
                    let text = field.to_text().ok_or_else(|| {
                        Error::malformed(format!("non-scalar text for <{}>", element.name))
                    })?;
                    element.set_text(text);
                    continue;
                }
                match field {
                    Value::Array(items) => {
                        for item in items {
                            element
                                .children
                                .push(Content::Element(item_to_element(item, key, options)?));
                        }
                    }
                    Value::Object(_) | Value::Null => {
                        element
                            .children
                            .push(Content::Element(item_to_element(field, key, options)?));
                    }
                    scalar => {
                        check_name(key)?;
                        let text = scalar.to_text().unwrap_or_default();
                        element.attributes.insert(key.clone(), text);
                    }
                }
            }
            Ok(())
        }
        Value::Array(_) => Err(Error::malformed(format!(
            "array directly inside array for <{}>",
            element.name
        ))),
        Value::Null => Ok(()),
        scalar => {
            element.set_text(scalar.to_text().unwrap_or_default());
            Ok(())
        }
    }
}

/// Parse JSON text into a [`Value`]
pub fn from_json_str(s: &str) -> Result<Value> {
    serde_json::from_str::<serde_json::Value>(s)
        .map(Value::from)
        .map_err(|err| Error::json(&err))
}

/// Serialize a [`Value`] to JSON text; pretty output indents by 4 spaces
pub fn to_json_string(value: &Value, pretty: bool) -> Result<String> {
    let options = if pretty {
        JsonWriteOptions::default()
    } else {
        JsonWriteOptions::compact()
    };
    to_json_string_with_options(value, &options)
}

/// Serialize a [`Value`] to JSON text with options
pub fn to_json_string_with_options(value: &Value, options: &JsonWriteOptions) -> Result<String> {
    let json = if options.sort_keys {
        let mut sorted = value.clone();
        sorted.sort_keys();
        serde_json::Value::from(&sorted)
    } else {
        serde_json::Value::from(value)
    };
    if !options.pretty {
        return serde_json::to_string(&json).map_err(|err| Error::json(&err));
    }

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    json.serialize(&mut serializer)
        .map_err(|err| Error::json(&err))?;
    String::from_utf8(buffer).map_err(|_| Error::malformed("json output is not utf-8"))
}
