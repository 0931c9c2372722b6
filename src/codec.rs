// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! The structural form boundary.
//!
//! Operations cross a transport as JSON. Decoding is the only place where
//! input can be malformed; everything past it works on well-formed values.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::DecodeError;
use crate::error::EncodeError;

/// Encode `value` as a JSON string.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, EncodeError> {
    return Ok(serde_json::to_string(value)?);
}

/// Decode a value from a JSON string.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, DecodeError> {
    return serde_json::from_str(json).map_err(|err| {
        debug!(error = %err, "rejected operation");
        return DecodeError::from(err);
    });
}

/// Convert `value` to a JSON tree.
pub fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, EncodeError> {
    return Ok(serde_json::to_value(value)?);
}

/// Decode a value from a JSON tree.
pub fn from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, DecodeError> {
    return serde_json::from_value(value).map_err(|err| {
        debug!(error = %err, "rejected operation");
        return DecodeError::from(err);
    });
}
