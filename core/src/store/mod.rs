//! The key-value store contract and its implementations.
//!
//! # Design
//! The repository only needs five primitives plus a liveness check. Values
//! are opaque bytes; encoding is the repository's concern. `incr` must be a
//! single atomic operation inside the store: two callers racing on the same
//! key always observe different post-increment values.

mod memory;
mod redis;

use async_trait::async_trait;

use crate::error::StoreError;

pub use self::memory::MemoryStore;
pub use self::redis::{RedisStore, DEFAULT_TIMEOUT};

#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Atomically increment `key`, creating it at 0 if absent, and return
    /// the post-increment value.
    async fn incr(&self, key: &str) -> Result<u64, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Remove `key` and return how many keys were removed (0 or 1).
    async fn delete(&self, key: &str) -> Result<u64, StoreError>;

    /// All keys starting with `prefix`, in no particular order.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
