use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::store::StateStore;

#[derive(Default)]
struct Tables {
    hashes: HashMap<String, HashMap<String, String>>,
    lists: HashMap<String, VecDeque<String>>,
    counters: HashMap<String, u64>,
}

/// Process-local store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))
    }

    /// Length of `list`; zero when it does not exist.
    pub fn list_len(&self, list: &str) -> usize {
        self.lock()
            .map(|t| t.lists.get(list).map_or(0, VecDeque::len))
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl StateStore for InMemoryStore {
    async fn hset(&self, map: &str, field: &str, value: &str) -> anyhow::Result<()> {
        self.lock()?
            .hashes
            .entry(map.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hget(&self, map: &str, field: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .lock()?
            .hashes
            .get(map)
            .and_then(|h| h.get(field))
            .cloned())
    }

    async fn hdel(&self, map: &str, fields: &[String]) -> anyhow::Result<usize> {
        let mut tables = self.lock()?;
        let Some(hash) = tables.hashes.get_mut(map) else {
            return Ok(0);
        };
        Ok(fields.iter().filter(|f| hash.remove(*f).is_some()).count())
    }

    async fn hkeys(&self, map: &str) -> anyhow::Result<Vec<String>> {
        Ok(self
            .lock()?
            .hashes
            .get(map)
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn rpush(&self, list: &str, value: &str) -> anyhow::Result<usize> {
        let mut tables = self.lock()?;
        let queue = tables.lists.entry(list.to_string()).or_default();
        queue.push_back(value.to_string());
        Ok(queue.len())
    }

    async fn lpop(&self, list: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .lock()?
            .lists
            .get_mut(list)
            .and_then(VecDeque::pop_front))
    }

    async fn incr(&self, key: &str) -> anyhow::Result<u64> {
        let mut tables = self.lock()?;
        let counter = tables.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
