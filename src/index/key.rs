//! Key Encoder
//!
//! Canonical textual form of indexable scalars and the `IndexKey` filter type.

use std::fmt;

use serde_json::Value;

use crate::document::ID_PATH;

use super::filename;

/// A scalar that can be part of an index token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexValue {
    String(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    /// Raw bytes, hex-encoded as-is instead of through a canonical string
    Bytes(Vec<u8>),
}

impl IndexValue {
    /// Convert a scalar from a record's value tree
    ///
    /// Floats, containers and `null` have no canonical form and return `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(IndexValue::String(s.clone())),
            Value::Bool(b) => Some(IndexValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(IndexValue::Int)
                .or_else(|| n.as_u64().map(IndexValue::Uint)),
            _ => None,
        }
    }

    /// The canonical string: literal, `true`/`false` or decimal
    ///
    /// Byte values have no canonical string, they are lossily decoded here
    /// and only ever hex-encoded raw by [`encode_scalar`].
    pub fn canonical(&self) -> String {
        match self {
            IndexValue::String(s) => s.clone(),
            IndexValue::Bool(b) => b.to_string(),
            IndexValue::Int(i) => i.to_string(),
            IndexValue::Uint(u) => u.to_string(),
            IndexValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }

    /// `""`, `false`, `0` and empty bytes
    pub fn is_zero(&self) -> bool {
        match self {
            IndexValue::String(s) => s.is_empty(),
            IndexValue::Bool(b) => !b,
            IndexValue::Int(i) => *i == 0,
            IndexValue::Uint(u) => *u == 0,
            IndexValue::Bytes(b) => b.is_empty(),
        }
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            other => f.write_str(&other.canonical()),
        }
    }
}

impl From<&str> for IndexValue {
    fn from(value: &str) -> Self {
        IndexValue::String(value.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(value: String) -> Self {
        IndexValue::String(value)
    }
}

impl From<&String> for IndexValue {
    fn from(value: &String) -> Self {
        IndexValue::String(value.clone())
    }
}

impl From<bool> for IndexValue {
    fn from(value: bool) -> Self {
        IndexValue::Bool(value)
    }
}

impl From<Vec<u8>> for IndexValue {
    fn from(value: Vec<u8>) -> Self {
        IndexValue::Bytes(value)
    }
}

impl From<&[u8]> for IndexValue {
    fn from(value: &[u8]) -> Self {
        IndexValue::Bytes(value.to_vec())
    }
}

macro_rules! impl_from_int {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for IndexValue {
                fn from(value: $t) -> Self {
                    IndexValue::$variant(value as $wide)
                }
            }
        )*
    };
}

impl_from_int!(Int as i64: i8, i16, i32, i64, isize);
impl_from_int!(Uint as u64: u8, u16, u32, u64, usize);

/// Encode a scalar into the hex form used inside tokens
///
/// Total over every input: an absent value encodes like the empty string.
pub fn encode_scalar(value: Option<&IndexValue>) -> String {
    match value {
        Some(IndexValue::Bytes(b)) => hex::encode(b),
        Some(other) => hex::encode(other.canonical()),
        None => String::new(),
    }
}

/// A field path paired with the value to look for
///
/// ```rust,ignore
/// let by_name = IndexKey::new("username").value("root");
/// let users: Vec<User> = engine.find_all(&[by_name])?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    path: String,
    value: Option<IndexValue>,
}

impl IndexKey {
    /// A key without a value
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: None,
        }
    }

    /// Key on the record id
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(ID_PATH).value(id.into())
    }

    /// Attach a value
    pub fn value(mut self, value: impl Into<IndexValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get_value(&self) -> Option<&IndexValue> {
        self.value.as_ref()
    }

    /// A filter is ignored when its value is absent or zero
    pub fn is_unset(&self) -> bool {
        self.value.as_ref().map_or(true, IndexValue::is_zero)
    }

    /// The filename token for this key
    pub fn token(&self) -> String {
        filename::build_token(&self.path, self.value.as_ref())
    }
}
