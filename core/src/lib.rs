//! Storage core for the to-do list service.
//!
//! # Overview
//! Allocates list ids and persists lists in a shared key-value store. The
//! HTTP layer lives in the `todo-server` crate and only ever calls the four
//! `TodoRepository` operations.
//!
//! # Design
//! - `KeyValueStore` is the only way the core touches durable state.
//!   `MemoryStore` serves tests and local runs, `RedisStore` production.
//! - Ids come from the store's atomic increment (`IdAllocator`), never from
//!   an in-process counter, so several server instances can share a store.
//! - `Keyspace` keeps the counter and the list entries in disjoint key
//!   ranges; values are JSON arrays of strings (`codec`).
//! - Errors are typed (`TodoError`) so the boundary can map each kind to a
//!   status code without inspecting messages.

pub mod allocator;
pub mod codec;
pub mod error;
pub mod keys;
pub mod repository;
pub mod store;
pub mod types;

pub use allocator::IdAllocator;
pub use error::{StoreError, TodoError};
pub use keys::{Keyspace, NamespaceError, DEFAULT_NAMESPACE};
pub use repository::TodoRepository;
pub use store::{KeyValueStore, MemoryStore, RedisStore};
pub use types::{CreateTodoList, ListId, ParseListIdError, TodoList};
