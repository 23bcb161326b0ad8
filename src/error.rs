//! Error types for filedex
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FiledexError
pub type Result<T> = std::result::Result<T, FiledexError>;

/// Unified error type for filedex operations
#[derive(Debug, Error)]
pub enum FiledexError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Registration Errors
    // -------------------------------------------------------------------------
    #[error("{0} is not registered, register it before saving, finding or deleting")]
    NotRegistered(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("{0} has no metadata block, embed a `meta: Meta` field")]
    MissingMetadata(String),

    #[error("Metadata block of {type_name} has the wrong shape: {reason}")]
    InvalidMetadataType { type_name: String, reason: String },

    #[error("Empty index keys are not allowed")]
    EmptyKey,

    #[error("{0} is always indexed and must not be registered manually")]
    ReservedKey(String),

    #[error("Segment {segment} of key {path} is not a nested struct")]
    InvalidNestedKey { path: String, segment: String },

    #[error("Key {path} has unsupported type {kind}, allowed are string, bool and integers")]
    UnsupportedKeyType { path: String, kind: String },

    #[error("Key {path} contains {character:?}, which cannot appear in a filename")]
    InvalidKeyCharacter { path: String, character: char },

    // -------------------------------------------------------------------------
    // Field Access Errors
    // -------------------------------------------------------------------------
    #[error("Field {segment} of key {path} not found")]
    FieldNotFound { path: String, segment: String },

    #[error("Cannot assign {found} to {expected} at {path}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("No document found")]
    NoDocumentFound,

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Filename of {len} bytes exceeds the {max} byte limit, shorten the indexed values")]
    FilenameTooLong { len: usize, max: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Find worker panicked: {0}")]
    WorkerPanicked(String),
}

impl FiledexError {
    /// True for the "nothing matched" outcome of a single-record find
    pub fn is_not_found(&self) -> bool {
        matches!(self, FiledexError::NoDocumentFound)
    }
}

impl From<serde_json::Error> for FiledexError {
    fn from(err: serde_json::Error) -> Self {
        FiledexError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for FiledexError {
    fn from(err: bincode::Error) -> Self {
        FiledexError::Serialization(err.to_string())
    }
}
