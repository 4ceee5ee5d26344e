//! Dot-separated JSON key paths.
//!
//! A path such as `cpu.highPriority` selects `body["cpu"]["highPriority"]` when
//! reading and produces `{"cpu": {"highPriority": value}}` when writing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyPathError {
    #[error("key path is empty")]
    Empty,

    #[error("key path '{0}' contains an empty segment")]
    EmptySegment(String),
}

/// Parsed, non-empty sequence of object keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn parse(raw: &str) -> Result<Self, KeyPathError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(KeyPathError::Empty);
        }
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(KeyPathError::EmptySegment(raw.to_string()));
        }
        Ok(Self { segments })
    }

    /// Build from a literal known to be well formed.
    pub(crate) fn from_static(raw: &'static str) -> Self {
        Self {
            segments: raw.split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk `body` along the path.
    ///
    /// A missing key, or a non-object on the way, resolves to an empty object, so a
    /// wrong path shows up later as a value that cannot be coerced rather than here.
    pub fn lookup(&self, body: &Value) -> Value {
        let empty = Value::Object(Map::new());
        let mut current = body;
        for segment in &self.segments {
            current = current.get(segment).unwrap_or(&empty);
        }
        current.clone()
    }

    /// Wrap `value` in nested objects, one per segment.
    pub fn nest(&self, value: Value) -> Value {
        self.segments.iter().rev().fold(value, |inner, segment| {
            let mut object = Map::new();
            object.insert(segment.clone(), inner);
            Value::Object(object)
        })
    }
}

impl FromStr for KeyPath {
    type Err = KeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KeyPath {
    type Error = KeyPathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<KeyPath> for String {
    fn from(path: KeyPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
