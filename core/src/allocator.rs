//! Identifier allocation on top of the store's atomic increment.
//!
//! # Design
//! The counter is never read and written back by this process. One `incr`
//! call is the whole allocation, so any number of service instances sharing
//! the store hand out distinct ids. The counter holds the last id handed
//! out; a missing counter means nothing has been allocated yet.

use std::sync::Arc;

use crate::error::{StoreError, TodoError};
use crate::store::KeyValueStore;
use crate::types::ListId;

#[derive(Clone)]
pub struct IdAllocator {
    store: Arc<dyn KeyValueStore>,
    counter_key: String,
}

impl IdAllocator {
    pub fn new(store: Arc<dyn KeyValueStore>, counter_key: impl Into<String>) -> Self {
        Self {
            store,
            counter_key: counter_key.into(),
        }
    }

    /// Allocate the next id. The first call on a fresh store returns 1.
    pub async fn next_id(&self) -> Result<ListId, TodoError> {
        let value = match self.store.incr(&self.counter_key).await {
            Ok(value) => value,
            Err(StoreError::WrongType(reason)) => {
                return Err(TodoError::CorruptData {
                    key: self.counter_key.clone(),
                    reason,
                })
            }
            Err(e) => return Err(e.into()),
        };
        if value == 0 {
            return Err(TodoError::CorruptData {
                key: self.counter_key.clone(),
                reason: "counter incremented to zero".to_string(),
            });
        }
        tracing::debug!(id = value, counter = %self.counter_key, "allocated list id");
        Ok(ListId::new(value))
    }
}

impl std::fmt::Debug for IdAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdAllocator")
            .field("counter_key", &self.counter_key)
            .finish_non_exhaustive()
    }
}
