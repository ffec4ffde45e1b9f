//! Stored value format: a JSON array of strings.

use crate::error::TodoError;

pub fn encode_tasks(tasks: &[String]) -> Result<Vec<u8>, TodoError> {
    serde_json::to_vec(tasks).map_err(|e| TodoError::InvalidInput(e.to_string()))
}

/// Decode a stored value. Anything other than a JSON array of strings is an
/// error, including the empty byte string.
pub fn decode_tasks(bytes: &[u8]) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_slice(bytes)
}
