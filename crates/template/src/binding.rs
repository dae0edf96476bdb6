//! Field value resolution

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Rendered for a `true` flag
pub const CHECK_GLYPH: &str = "✓";

/// A record's answer for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Checkbox-like value
    Flag(bool),
    Missing,
}

impl FieldValue {
    /// The string drawn on the page
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Flag(true) => CHECK_GLYPH.to_string(),
            FieldValue::Flag(false) | FieldValue::Missing => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        FieldValue::Flag(flag)
    }
}

/// Anything a template can be filled from
///
/// The renderer only ever asks a record for the value of a key.
pub trait DataRecord {
    fn value(&self, key: &str) -> FieldValue;
}

/// Text to draw for `key`: flags become [`CHECK_GLYPH`] or nothing,
/// missing keys become an empty string
pub fn resolve_value<R: DataRecord + ?Sized>(record: &R, key: &str) -> String {
    record.value(key).into_text()
}

impl<R: DataRecord + ?Sized> DataRecord for &R {
    fn value(&self, key: &str) -> FieldValue {
        (**self).value(key)
    }
}

impl DataRecord for BTreeMap<String, String> {
    fn value(&self, key: &str) -> FieldValue {
        self.get(key)
            .map_or(FieldValue::Missing, |v| FieldValue::Text(v.clone()))
    }
}

impl DataRecord for HashMap<String, String> {
    fn value(&self, key: &str) -> FieldValue {
        self.get(key)
            .map_or(FieldValue::Missing, |v| FieldValue::Text(v.clone()))
    }
}

/// Keys are dotted paths with optional indices: `patient.name`, `visits[0].date`.
/// A leading `$.` is accepted.
impl DataRecord for Value {
    fn value(&self, key: &str) -> FieldValue {
        resolve_path(key, self).map_or(FieldValue::Missing, json_value)
    }
}

fn json_value(value: &Value) -> FieldValue {
    match value {
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Number(n) => FieldValue::Text(n.to_string()),
        Value::Bool(b) => FieldValue::Flag(*b),
        Value::Null => FieldValue::Missing,
        Value::Array(_) | Value::Object(_) => FieldValue::Text(value.to_string()),
    }
}

/// Resolve a dotted path against JSON data
///
/// Supports:
/// - `field` - Root field
/// - `object.field` - Nested field
/// - `array[0]` - Array index
/// - `array[0].field` - Array element field
pub fn resolve_path<'a>(path: &str, data: &'a Value) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() {
        return None;
    }

    let mut current = data;
    for segment in path.split('.') {
        let (field, mut indices) = match segment.find('[') {
            Some(pos) => (&segment[..pos], &segment[pos..]),
            None => (segment, ""),
        };

        if !field.is_empty() {
            current = current.get(field)?;
        }

        while let Some(rest) = indices.strip_prefix('[') {
            let close = rest.find(']')?;
            let index: usize = rest[..close].trim().parse().ok()?;
            current = current.get(index)?;
            indices = &rest[close + 1..];
        }
        if !indices.is_empty() {
            return None;
        }
    }

    Some(current)
}
