//! CRUD over to-do lists stored in a key-value store.
//!
//! # Design
//! `TodoRepository` is cheap to clone and holds no state of its own beyond
//! the store handle and the key layout. Each operation is a short sequence
//! of store calls: nothing is cached, nothing is retried, and store failures
//! come back as `TodoError::StoreUnavailable` unchanged.
//!
//! Decode failures, and values of the wrong kind for a list key, are treated
//! differently by the single and bulk reads: `get_list` reports
//! `CorruptData`, while `list_all` logs and skips the entry so one bad value
//! does not hide every other list.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::allocator::IdAllocator;
use crate::codec::{decode_tasks, encode_tasks};
use crate::error::{StoreError, TodoError};
use crate::keys::Keyspace;
use crate::store::KeyValueStore;
use crate::types::ListId;

#[derive(Clone)]
pub struct TodoRepository {
    store: Arc<dyn KeyValueStore>,
    keys: Keyspace,
    allocator: IdAllocator,
}

impl TodoRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: Keyspace) -> Self {
        let allocator = IdAllocator::new(Arc::clone(&store), keys.counter_key());
        Self {
            store,
            keys,
            allocator,
        }
    }

    pub fn keys(&self) -> &Keyspace {
        &self.keys
    }

    /// Store `tasks` under a freshly allocated id.
    ///
    /// The input is validated and encoded before the counter is touched, so
    /// rejected requests never consume an id.
    pub async fn create_list(&self, tasks: Vec<String>) -> Result<ListId, TodoError> {
        if tasks.is_empty() {
            return Err(TodoError::InvalidInput(
                "Tasks must be provided as a list".to_string(),
            ));
        }
        let value = encode_tasks(&tasks)?;

        let id = self.allocator.next_id().await?;
        self.store.set(&self.keys.list_key(id), &value).await?;
        tracing::info!(%id, tasks = tasks.len(), "to-do list saved");
        Ok(id)
    }

    pub async fn get_list(&self, id: ListId) -> Result<Vec<String>, TodoError> {
        let key = self.keys.list_key(id);
        let value = match self.store.get(&key).await {
            Ok(Some(value)) => value,
            Ok(None) => return Err(TodoError::NotFound(id)),
            Err(StoreError::WrongType(reason)) => return Err(TodoError::CorruptData { key, reason }),
            Err(e) => return Err(e.into()),
        };
        decode_tasks(&value).map_err(|e| TodoError::CorruptData {
            key,
            reason: e.to_string(),
        })
    }

    pub async fn delete_list(&self, id: ListId) -> Result<(), TodoError> {
        let removed = self.store.delete(&self.keys.list_key(id)).await?;
        if removed == 0 {
            return Err(TodoError::NotFound(id));
        }
        tracing::info!(%id, "to-do list deleted");
        Ok(())
    }

    /// Every decodable list currently in the store, keyed by id.
    pub async fn list_all(&self) -> Result<BTreeMap<ListId, Vec<String>>, TodoError> {
        let keys = self.store.keys_with_prefix(self.keys.list_prefix()).await?;
        let mut lists = BTreeMap::new();

        for key in keys {
            let Some(id) = self.keys.parse_list_key(&key) else {
                tracing::debug!(%key, "ignoring non-list key under list prefix");
                continue;
            };
            let value = match self.store.get(&key).await {
                Ok(Some(value)) => value,
                // Deleted between the scan and this read.
                Ok(None) => continue,
                Err(StoreError::WrongType(reason)) => {
                    tracing::warn!(%key, %reason, "skipping non-string value under list prefix");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            match decode_tasks(&value) {
                Ok(tasks) => {
                    lists.insert(id, tasks);
                }
                Err(e) => tracing::warn!(%key, error = %e, "skipping undecodable to-do list"),
            }
        }

        Ok(lists)
    }

    /// Check that the store answers.
    pub async fn ping(&self) -> Result<(), TodoError> {
        self.store.ping().await.map_err(TodoError::from)
    }
}

impl std::fmt::Debug for TodoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoRepository")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}
