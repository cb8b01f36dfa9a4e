//! JSON-facing value model shared by the converters

use indexmap::map::{IntoIter, Iter, Keys};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::ops::Index;

use crate::error::{Error, ErrorKind, Result};

/// A JSON value with order-preserving objects
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// Kept as parsed: integers exact to 64 bits, floats in shortest form
    Number(Number),
    String(String),
    Array(Array),
    Object(Object),
}

impl Value {
    /// Sort object keys at every nesting level, arrays keep their order
    pub fn sort_keys(&mut self) {
        match self {
            Self::Object(obj) => obj.sort_keys(),
            Self::Array(arr) => arr.0.iter_mut().for_each(Self::sort_keys),
            _ => {}
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for null, booleans, numbers and strings
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Text form of a scalar, as it is written into XML text or attributes.
    ///
    /// Integral numbers drop the fractional part (`42`, not `42.0`); null
    /// becomes the empty string. Arrays and objects have no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => Some(String::new()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Array(_) | Self::Object(_) => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Integral floats become integers so `42.0` prints as `42`; NaN and
/// infinities have no JSON form and become `Null`
impl From<f64> for Value {
    #[allow(clippy::as_conversions)]
    fn from(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
            return Self::Number(Number::from(value as i64));
        }
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::String)
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::Array(Array(values))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(arr) => Self::Array(arr.iter().map(Self::from).collect()),
            Value::Object(obj) => Self::Object(
                obj.iter()
                    .map(|(key, value)| (key.clone(), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serde_json::Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

/// JSON object keeping insertion order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object(pub(crate) IndexMap<String, Value>);

impl Object {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Insert or overwrite in place; a new key goes last
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a key from the object, keeping the order of the others
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Insert `key` at position `index`, moving it there if it already
    /// exists. `index` may equal the length after any existing `key` is
    /// taken out, which appends.
    pub fn insert_at(
        &mut self,
        index: usize,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let key = key.into();
        let len = self.0.len() - usize::from(self.0.contains_key(&key));
        if index > len {
            return Err(Error::conversion(ErrorKind::IndexOutOfBounds { index, len }));
        }
        let previous = self.0.shift_remove(&key);
        self.0.shift_insert(index, key, value.into());
        Ok(previous)
    }

    /// Insert `key` right after `target`
    pub fn insert_after(
        &mut self,
        target: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        self.insert_relative(target, key.into(), value.into(), 1)
    }

    /// Insert `key` right before `target`
    pub fn insert_before(
        &mut self,
        target: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        self.insert_relative(target, key.into(), value.into(), 0)
    }

    fn insert_relative(
        &mut self,
        target: &str,
        key: String,
        value: Value,
        offset: usize,
    ) -> Result<Option<Value>> {
        if !self.0.contains_key(target) {
            return Err(Error::conversion(ErrorKind::KeyNotFound {
                key: target.to_string(),
            }));
        }
        if key == target {
            return Ok(self.0.insert(key, value));
        }
        let previous = self.0.shift_remove(&key);
        let index = self
            .0
            .get_index_of(target)
            .map_or(self.0.len(), |index| index + offset);
        self.0.shift_insert(index, key, value);
        Ok(previous)
    }

    /// Sort keys at every nesting level
    pub fn sort_keys(&mut self) {
        self.0.sort_keys();
        for value in self.0.values_mut() {
            value.sort_keys();
        }
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl Index<&str> for Object {
    type Output = Value;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, key: &str) -> &Self::Output {
        &self.0[key]
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array(pub(crate) Vec<Value>);

impl Array {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl Index<usize> for Array {
    type Output = Value;

    #[allow(clippy::indexing_slicing)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(Vec::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind_methods() {
        assert!(Value::Null.is_null());
        assert!(Value::Null.is_scalar());
        assert!(Value::Bool(true).is_scalar());
        assert!(Value::from(1).is_scalar());
        assert!(!Value::Array(Array::new()).is_scalar());
        assert!(Value::Array(Array::new()).is_array());
        assert!(Value::Object(Object::new()).is_object());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(Value::from("abc").to_text(), Some("abc".to_string()));
        assert_eq!(Value::from(42.0).to_text(), Some("42".to_string()));
        assert_eq!(Value::from(2.5).to_text(), Some("2.5".to_string()));
        assert_eq!(Value::from(f64::NAN), Value::Null);
        assert_eq!(Value::Bool(false).to_text(), Some("false".to_string()));
        assert_eq!(Value::Null.to_text(), Some(String::new()));
        assert_eq!(Value::Object(Object::new()).to_text(), None);
    }

    #[test]
    fn test_object_order_preservation() {
        let mut obj = Object::new();
        obj.insert("third", 3i32);
        obj.insert("first", 1i32);
        obj.insert("second", 2i32);

        let keys: Vec<_> = obj.keys().collect();
        assert_eq!(keys, vec!["third", "first", "second"]);

        obj.remove("first");
        let keys: Vec<_> = obj.keys().collect();
        assert_eq!(keys, vec!["third", "second"]);
    }

    #[test]
    fn test_object_index() {
        let mut obj = Object::new();
        obj.insert("name", "Alice");
        obj.insert("age", 30i32);

        assert_eq!(obj["name"], Value::String("Alice".to_string()));
        assert_eq!(obj["age"], Value::from(30i64));
    }

    #[test]
    fn test_array_basics() {
        let mut arr = Array::new();
        assert!(arr.is_empty());
        arr.push("a");
        arr.push(Value::Null);
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.first(), Some(&Value::from("a")));
        assert_eq!(arr[1], Value::Null);
        assert_eq!(arr.get(2), None);
    }

    #[test]
    fn test_serde_json_conversion_keeps_order_and_integers() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b": 1, "a": [true, null, "x"], "c": 2.5}"#)
                .unwrap_or_default();
        let value = Value::from(json.clone());

        let keys: Vec<_> = value
            .as_object()
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["b", "a", "c"]);

        let back = serde_json::Value::from(&value);
        assert_eq!(back, json);
        assert_eq!(back.to_string(), r#"{"b":1,"a":[true,null,"x"],"c":2.5}"#);
    }

    #[test]
    fn test_serde_impls_go_through_json_model() {
        let mut obj = Object::new();
        obj.insert("count", 3i32);
        let text = serde_json::to_string(&Value::Object(obj.clone())).unwrap_or_default();
        assert_eq!(text, r#"{"count":3}"#);

        let parsed: Value = serde_json::from_str(&text).unwrap_or_default();
        assert_eq!(parsed, Value::Object(obj));
    }

    #[test]
    fn test_large_integers_stay_exact() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"id": 12345678901234567890, "n": 9007199254740993}"#)
                .unwrap_or_default();
        let value = Value::from(json);
        let obj = value.as_object().cloned().unwrap_or_default();
        assert_eq!(
            obj.get("id").and_then(Value::to_text),
            Some("12345678901234567890".to_string())
        );
        assert_eq!(
            obj.get("n").and_then(Value::to_text),
            Some("9007199254740993".to_string())
        );
        assert_eq!(
            serde_json::to_string(&value).unwrap_or_default(),
            r#"{"id":12345678901234567890,"n":9007199254740993}"#
        );
    }

    fn sample() -> Object {
        ["name", "age", "city"]
            .into_iter()
            .map(|key| (key.to_string(), Value::from(key)))
            .collect()
    }

    fn keys(obj: &Object) -> Vec<&str> {
        obj.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_insert_at() -> Result<()> {
        let mut obj = sample();
        obj.insert_at(1, "country", "KR")?;
        assert_eq!(keys(&obj), vec!["name", "country", "age", "city"]);

        // an existing key moves
        let previous = obj.insert_at(0, "city", "Seoul")?;
        assert_eq!(previous, Some(Value::from("city")));
        assert_eq!(keys(&obj), vec!["city", "name", "country", "age"]);

        obj.insert_at(4, "zip", "04524")?;
        assert_eq!(keys(&obj).last(), Some(&"zip"));

        let err = obj.insert_at(9, "far", 1).err();
        assert!(matches!(
            err.as_ref().map(Error::kind),
            Some(ErrorKind::IndexOutOfBounds { index: 9, len: 5 })
        ));
        assert_eq!(obj.len(), 5);
        Ok(())
    }

    #[test]
    fn test_insert_after_and_before() -> Result<()> {
        let mut obj = sample();
        obj.insert_after("age", "country", "KR")?;
        assert_eq!(keys(&obj), vec!["name", "age", "country", "city"]);

        obj.insert_before("name", "id", 7)?;
        assert_eq!(keys(&obj), vec!["id", "name", "age", "country", "city"]);

        // moving a key that sits before the target
        obj.insert_after("city", "id", 8)?;
        assert_eq!(keys(&obj), vec!["name", "age", "country", "city", "id"]);

        let err = obj.insert_before("missing", "x", 1).err();
        assert!(matches!(
            err.as_ref().map(Error::kind),
            Some(ErrorKind::KeyNotFound { key }) if key == "missing"
        ));
        Ok(())
    }

    #[test]
    fn test_sort_keys_is_recursive() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"b": {"z": 1, "a": 2}, "a": [{"d": 1, "c": 2}]}"#)
                .unwrap_or_default();
        let mut value = Value::from(json);
        value.sort_keys();
        assert_eq!(
            serde_json::to_string(&value).unwrap_or_default(),
            r#"{"a":[{"c":2,"d":1}],"b":{"a":2,"z":1}}"#
        );
    }
}
