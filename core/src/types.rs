//! Domain types for to-do lists.
//!
//! # Design
//! `ListId` wraps the numeric identifier handed out by the allocator so that
//! ids cannot be mixed up with counts or raw counter values. Request payloads
//! arrive as untyped JSON; `CreateTodoList::from_json` does the shape checks
//! itself so every violation becomes `TodoError::InvalidInput` with a message
//! the handler can return verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::TodoError;

/// Identifier of a stored to-do list. Allocated ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(u64);

impl ListId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("list id {0:?} is not a positive integer")]
pub struct ParseListIdError(pub String);

/// Accepts only the form `Display` produces: ASCII digits, no sign, no
/// leading zero, and never `0`.
impl FromStr for ListId {
    type Err = ParseListIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = !s.is_empty() && !s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit());
        if !canonical {
            return Err(ParseListIdError(s.to_string()));
        }
        s.parse().map(Self).map_err(|_| ParseListIdError(s.to_string()))
    }
}

/// A to-do list as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoList {
    pub id: ListId,
    pub tasks: Vec<String>,
}

/// Validated payload for creating a new list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTodoList {
    pub tasks: Vec<String>,
}

impl CreateTodoList {
    /// Validate a `{"tasks": [string, ...]}` request body.
    pub fn from_json(body: &Value) -> Result<Self, TodoError> {
        let object = body
            .as_object()
            .ok_or_else(|| invalid("request body must be a JSON object"))?;
        let tasks = object
            .get("tasks")
            .ok_or_else(|| invalid("Tasks must be provided as a list"))?;
        let items = tasks
            .as_array()
            .ok_or_else(|| invalid("Tasks must be provided as a list"))?;
        if items.is_empty() {
            return Err(invalid("Tasks must be provided as a list"));
        }

        let tasks = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| invalid(&format!("task at index {index} is not a string")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tasks })
    }
}

fn invalid(message: &str) -> TodoError {
    TodoError::InvalidInput(message.to_string())
}
