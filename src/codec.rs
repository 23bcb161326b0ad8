//! Payload codec
//!
//! Encoding and decoding of the bytes stored inside record files.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::PayloadFormat;
use crate::error::Result;

/// Encode a record in the given format
pub fn encode<T: Serialize>(format: PayloadFormat, record: &T) -> Result<Vec<u8>> {
    let bytes = match format {
        PayloadFormat::Json => serde_json::to_vec(record)?,
        PayloadFormat::JsonPretty => serde_json::to_vec_pretty(record)?,
        PayloadFormat::Bincode => bincode::serialize(record)?,
    };
    Ok(bytes)
}

/// Decode a record from the given format
pub fn decode<T: DeserializeOwned>(format: PayloadFormat, bytes: &[u8]) -> Result<T> {
    let record = match format {
        PayloadFormat::Json | PayloadFormat::JsonPretty => serde_json::from_slice(bytes)?,
        PayloadFormat::Bincode => bincode::deserialize(bytes)?,
    };
    Ok(record)
}
