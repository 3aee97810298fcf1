//! Key-value store seam used for every piece of shared game state.
//!
//! Each call is atomic on its own. Nothing groups several calls into a
//! transaction, so callers must tolerate other writers interleaving
//! between any two of their calls.

#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// Set `field` in hash `map` to `value`.
    async fn hset(&self, map: &str, field: &str, value: &str) -> anyhow::Result<()>;
    async fn hget(&self, map: &str, field: &str) -> anyhow::Result<Option<String>>;
    /// Remove `fields` from hash `map`, returning how many existed.
    async fn hdel(&self, map: &str, fields: &[String]) -> anyhow::Result<usize>;
    async fn hkeys(&self, map: &str) -> anyhow::Result<Vec<String>>;
    /// Append to the tail of `list`, returning its new length.
    async fn rpush(&self, list: &str, value: &str) -> anyhow::Result<usize>;
    /// Pop from the head of `list`.
    async fn lpop(&self, list: &str) -> anyhow::Result<Option<String>>;
    /// Increment counter `key` and return the new value. Missing counters
    /// start at zero.
    async fn incr(&self, key: &str) -> anyhow::Result<u64>;
}

pub mod in_memory;
