//! Error types for the todo core.
//!
//! # Design
//! `StoreError` describes what went wrong talking to the key-value store.
//! `TodoError` is what repository callers see: the request was malformed,
//! the list does not exist, the stored bytes could not be decoded, or the
//! store could not be used at all. Store failures are carried through
//! `StoreUnavailable` untranslated so the caller decides whether to retry.
//! `StoreError::WrongType` is the exception: the store is healthy but the key
//! holds something that is not a list, so the repository reports it as
//! `CorruptData`.

use std::time::Duration;

use thiserror::Error;

use crate::types::ListId;

/// Failures reported by a `KeyValueStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached, or a pooled connection could not be
    /// checked out.
    #[error("store connection failed: {0}")]
    Connection(String),

    /// The store answered but rejected the command.
    #[error("store rejected command: {0}")]
    Command(String),

    /// The key exists but holds a value of a kind the command cannot read,
    /// such as a Redis hash where a string was expected.
    #[error("wrong kind of value stored: {0}")]
    WrongType(String),

    /// The operation did not finish within the configured bound.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors returned by `TodoRepository` operations.
#[derive(Debug, Error)]
pub enum TodoError {
    /// The request payload was not a non-empty list of strings.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No live entry exists for the id.
    #[error("to-do list {0} not found")]
    NotFound(ListId),

    /// An entry exists under `key` but its value could not be decoded.
    #[error("corrupt data under key {key}: {reason}")]
    CorruptData { key: String, reason: String },

    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

impl From<redis::RedisError> for StoreError {
    fn from(error: redis::RedisError) -> Self {
        if error.is_io_error()
            || error.is_connection_refusal()
            || error.is_connection_dropped()
            || error.is_timeout()
        {
            StoreError::Connection(error.to_string())
        } else if error.code() == Some("WRONGTYPE") {
            StoreError::WrongType(error.to_string())
        } else {
            StoreError::Command(error.to_string())
        }
    }
}
