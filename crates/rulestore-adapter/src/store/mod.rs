//! Ordered list store gateway
//!
//! The adapter only needs a handful of list primitives from its backing
//! store. They are collected behind [`ListStore`] so the Redis client can be
//! swapped for the in-process [`MemoryListStore`] in tests and tooling.

use async_trait::async_trait;
use rulestore_core::Result;

pub mod memory;
pub mod redis_list;

pub use memory::MemoryListStore;
pub use redis_list::RedisListStore;

/// Primitives over one ordered, duplicate-permitting list per key
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Number of elements, `None` when the key does not exist
    async fn len(&self, key: &str) -> Result<Option<usize>>;

    /// Elements `start..=end`, with `LRANGE` index rules: negative indices
    /// count from the tail and an `end` past the tail is clamped
    async fn range(&self, key: &str, start: isize, end: isize) -> Result<Vec<String>>;

    /// Append one element at the tail
    async fn push_tail(&self, key: &str, record: &str) -> Result<()>;

    /// Remove the earliest element equal to `record`; returns how many were removed
    async fn remove_first(&self, key: &str, record: &str) -> Result<usize>;

    /// Delete the whole list
    async fn delete(&self, key: &str) -> Result<()>;

    /// Swap the list contents for `records`, in order
    async fn replace_all(&self, key: &str, records: &[String]) -> Result<()>;

    /// Switch to another logical database
    async fn select_db(&mut self, index: i64) -> Result<()>;
}
