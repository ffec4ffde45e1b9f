//! Key layout inside the shared key-value store.
//!
//! # Design
//! All keys live under one namespace root. The counter and the list entries
//! are separated structurally:
//!
//! - `{namespace}:next_id`: the id counter
//! - `{namespace}:list:{id}`: one JSON-encoded list per id
//!
//! Enumeration only ever scans `{namespace}:list:`, which the counter key
//! cannot match, so listing never sees the counter or keys added by other
//! features under the same root.

use thiserror::Error;

use crate::types::ListId;

pub const DEFAULT_NAMESPACE: &str = "todo";

const COUNTER_SUFFIX: &str = "next_id";
const LIST_SEGMENT: &str = "list";

/// Characters with special meaning in store match patterns.
const RESERVED: &[char] = &['*', '?', '[', ']', '\\'];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid key namespace {namespace:?}: {reason}")]
pub struct NamespaceError {
    pub namespace: String,
    pub reason: &'static str,
}

/// Maps ids to store keys and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    counter_key: String,
    list_prefix: String,
}

impl Keyspace {
    pub fn new(namespace: &str) -> Result<Self, NamespaceError> {
        let reject = |reason| {
            Err(NamespaceError {
                namespace: namespace.to_string(),
                reason,
            })
        };
        if namespace.is_empty() {
            return reject("must not be empty");
        }
        if namespace.chars().any(char::is_whitespace) {
            return reject("must not contain whitespace");
        }
        if namespace.contains(RESERVED) {
            return reject("must not contain pattern characters");
        }

        Ok(Self::layout(namespace))
    }

    fn layout(namespace: &str) -> Self {
        Self {
            counter_key: format!("{namespace}:{COUNTER_SUFFIX}"),
            list_prefix: format!("{namespace}:{LIST_SEGMENT}:"),
        }
    }

    pub fn counter_key(&self) -> &str {
        &self.counter_key
    }

    pub fn list_prefix(&self) -> &str {
        &self.list_prefix
    }

    pub fn list_key(&self, id: ListId) -> String {
        format!("{}{id}", self.list_prefix)
    }

    /// Recover the id from a list key.
    ///
    /// Returns `None` for keys outside the list prefix and for suffixes that
    /// are not the canonical decimal form of a positive id, so `list:007`
    /// or `list:0` are never mistaken for real entries.
    pub fn parse_list_key(&self, key: &str) -> Option<ListId> {
        key.strip_prefix(&self.list_prefix)?.parse().ok()
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::layout(DEFAULT_NAMESPACE)
    }
}
