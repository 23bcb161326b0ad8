//! Filename Codec
//!
//! Builds record filenames out of index tokens and matches them against
//! filters.
//!
//! ## Format
//! ```text
//! username=726f6f74=username:age=3432=age:meta.id=6162=meta.id
//! └─────── token ──────────┘ └─ token ─┘ └──── id token ─────┘
//! ```
//!
//! Matching is a substring test per token, not a parse. A value whose hex
//! happens to contain another token's text can produce a false positive;
//! the duplicated path on both sides of every token keeps that rare.

use crate::error::{FiledexError, Result};

use super::key::{encode_scalar, IndexValue};

/// Joins tokens inside a filename
pub const SEPARATOR: char = ':';

/// Separates a token's path from its value
pub const TOKEN_DELIMITER: char = '=';

/// Names with this prefix are never records
pub const HIDDEN_PREFIX: char = '.';

/// Characters a key path must not contain
///
/// Either platform's path separator, NUL, and the codec's own delimiters.
pub const FORBIDDEN_KEY_CHARS: [char; 5] = ['/', '\\', '\0', SEPARATOR, TOKEN_DELIMITER];

/// `path=hex(value)=path`
pub fn build_token(path: &str, value: Option<&IndexValue>) -> String {
    let hex = encode_scalar(value);
    let mut token = String::with_capacity(path.len() * 2 + hex.len() + 2);
    token.push_str(path);
    token.push(TOKEN_DELIMITER);
    token.push_str(&hex);
    token.push(TOKEN_DELIMITER);
    token.push_str(path);
    token
}

/// Join tokens in order
pub fn build_filename<S: AsRef<str>>(tokens: &[S]) -> String {
    let separator = SEPARATOR.to_string();
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(separator.as_str())
}

/// Metadata, temp files and anything else starting with `.`
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_PREFIX)
}

/// True iff `name` is a record and contains every required token
///
/// An empty token list matches every record.
pub fn matches<S: AsRef<str>>(name: &str, required: &[S]) -> bool {
    if is_hidden(name) {
        return false;
    }
    required.iter().all(|token| name.contains(token.as_ref()))
}

/// Split a filename back into `(path, raw value bytes)` pairs
///
/// Only meant for inspection: paths containing `:` or `=` cannot round-trip.
pub fn decode_filename(name: &str) -> Result<Vec<(String, Vec<u8>)>> {
    if is_hidden(name) {
        return Err(FiledexError::InvalidFilename(format!(
            "{} is a hidden entry",
            name
        )));
    }

    name.split(SEPARATOR)
        .map(|token| {
            let mut parts = token.splitn(3, TOKEN_DELIMITER);
            let (Some(head), Some(encoded), Some(tail)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(FiledexError::InvalidFilename(format!(
                    "malformed token {}",
                    token
                )));
            };

            if head != tail {
                return Err(FiledexError::InvalidFilename(format!(
                    "token {} opens with {} but closes with {}",
                    token, head, tail
                )));
            }

            let bytes = hex::decode(encoded).map_err(|e| {
                FiledexError::InvalidFilename(format!("bad hex in token {}: {}", token, e))
            })?;

            Ok((head.to_string(), bytes))
        })
        .collect()
}
