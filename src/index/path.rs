//! Field Path Resolver
//!
//! Reads and writes a dotted field path inside the `serde_json::Value` tree
//! of a record. `Option` fields serialize to `null`, so a `null` anywhere on
//! the path reads as an absent, zero value instead of an error.

use std::fmt;

use serde_json::Value;

use crate::error::{FiledexError, Result};

/// A parsed, dot-separated path into a record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path like `address.city`
    ///
    /// Fails with `EmptyKey` for an empty path or an empty segment (`a..b`).
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(FiledexError::EmptyKey);
        }

        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(FiledexError::EmptyKey);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The path as written at registration
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Individual segments, outermost first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn not_found(&self, segment: &str) -> FiledexError {
        FiledexError::FieldNotFound {
            path: self.raw.clone(),
            segment: segment.to_string(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Kind of a JSON value, used for type checks and error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_f64() => ValueKind::Float,
            Value::Number(_) => ValueKind::Integer,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Kinds that can be encoded into an index token
    pub fn is_indexable(self) -> bool {
        matches!(self, ValueKind::Bool | ValueKind::Integer | ValueKind::String)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Result of reading a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldValue<'a> {
    /// The scalar at the path, `None` when absent or not indexable
    pub value: Option<&'a Value>,

    /// True for absent values and `""`, `false`, `0`
    pub is_zero: bool,
}

impl<'a> FieldValue<'a> {
    const ABSENT: Self = FieldValue {
        value: None,
        is_zero: true,
    };
}

/// Read the value at `path`
///
/// Only fails when a segment does not exist, which registration rules out
/// for every registered path.
pub fn get<'a>(record: &'a Value, path: &FieldPath) -> Result<FieldValue<'a>> {
    let mut current = record;

    for segment in path.segments() {
        current = match current {
            Value::Null => return Ok(FieldValue::ABSENT),
            Value::Object(map) => map.get(segment).ok_or_else(|| path.not_found(segment))?,
            _ => return Err(path.not_found(segment)),
        };
    }

    let is_zero = match current {
        Value::Null | Value::Array(_) | Value::Object(_) => return Ok(FieldValue::ABSENT),
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
    };

    Ok(FieldValue {
        value: Some(current),
        is_zero,
    })
}

/// Write `value` at `path`
///
/// The leaf must already exist. A `null` leaf accepts any kind, otherwise
/// the new value must have the same kind as the old one.
pub fn set(record: &mut Value, path: &FieldPath, value: Value) -> Result<()> {
    let (leaf, parents) = path
        .segments()
        .split_last()
        .ok_or(FiledexError::EmptyKey)?;

    let mut current = record;
    for segment in parents {
        current = match current {
            Value::Object(map) => map.get_mut(segment).ok_or_else(|| path.not_found(segment))?,
            _ => return Err(path.not_found(segment)),
        };
    }

    let slot = match current {
        Value::Object(map) => map.get_mut(leaf).ok_or_else(|| path.not_found(leaf))?,
        _ => return Err(path.not_found(leaf)),
    };

    let expected = ValueKind::of(slot);
    let found = ValueKind::of(&value);
    if expected != ValueKind::Null && expected != found {
        return Err(FiledexError::TypeMismatch {
            path: path.as_str().to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }

    *slot = value;
    Ok(())
}
