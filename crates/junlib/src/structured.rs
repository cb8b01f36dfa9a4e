//! Plain-dict view of an element tree
//!
//! Leaves carry their text, branches map child names to fields. A name seen
//! once among siblings is a [`FieldValue::Single`]; a repeated name is
//! promoted to [`FieldValue::Many`] holding every occurrence in document
//! order. Branch text and attributes are not represented; use the
//! [`json`](crate::json) variant when those must survive.

use indexmap::map::Iter;
use indexmap::IndexMap;
use serde::Serialize;

use crate::value::{Object, Value};
use crate::xml::model::Element;

/// Structured form of one element
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StructuredValue {
    /// Element without child elements; `None` when it has no text
    Leaf(Option<String>),
    /// Element with child elements
    Branch(Fields),
}

/// One field of a branch
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(StructuredValue),
    Many(Vec<StructuredValue>),
}

/// Ordered fields of a branch, keyed by child name
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Fields(IndexMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> Iter<'_, String, FieldValue> {
        self.0.iter()
    }

    /// Add an occurrence of `name`, promoting to `Many` on the second one
    pub fn push(&mut self, name: &str, value: StructuredValue) {
        match self.0.get_mut(name) {
            Some(FieldValue::Many(items)) => items.push(value),
            Some(field) => {
                let first = std::mem::replace(field, FieldValue::Many(Vec::new()));
                if let FieldValue::Single(first) = first {
                    *field = FieldValue::Many(vec![first, value]);
                }
            }
            None => {
                self.0.insert(name.to_string(), FieldValue::Single(value));
            }
        }
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FieldValue {
    /// All occurrences, one for `Single`
    pub fn items(&self) -> &[StructuredValue] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

impl StructuredValue {
    pub fn as_leaf(&self) -> Option<Option<&str>> {
        match self {
            Self::Leaf(text) => Some(text.as_deref()),
            Self::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Fields> {
        match self {
            Self::Branch(fields) => Some(fields),
            Self::Leaf(_) => None,
        }
    }

    /// JSON-facing form: `Null`/`String` leaves, objects, arrays for `Many`
    pub fn to_value(&self) -> Value {
        match self {
            Self::Leaf(text) => Value::from(text.clone()),
            Self::Branch(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, field)| {
                        let value = match field {
                            FieldValue::Single(value) => value.to_value(),
                            FieldValue::Many(values) => {
                                Value::from(values.iter().map(Self::to_value).collect::<Vec<_>>())
                            }
                        };
                        (name.clone(), value)
                    })
                    .collect(),
            ),
        }
    }
}

impl From<&Element> for StructuredValue {
    fn from(element: &Element) -> Self {
        element_to_structured(element)
    }
}

/// Convert an element tree into its plain-dict structured form
pub fn element_to_structured(element: &Element) -> StructuredValue {
    if !element.has_children() {
        let text = element.text().filter(|text| !text.trim().is_empty());
        return StructuredValue::Leaf(text);
    }

    let mut fields = Fields::new();
    for child in element.child_elements() {
        fields.push(&child.name, element_to_structured(child));
    }
    StructuredValue::Branch(fields)
}

/// The tree as `{ root_name: structured }`
pub fn element_to_dict(element: &Element) -> Value {
    let mut root = Object::new();
    root.insert(&element.name, element_to_structured(element).to_value());
    Value::Object(root)
}
