//! In-process store.

use moka::future::Cache as MokaCache;

use super::{KeyValueStore, StoreError};

/// Bounded in-memory store; least recently used keys go first when full.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: MokaCache<String, String>,
}

impl MemoryStore {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            entries: MokaCache::builder().max_capacity(max_capacity).build(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).await)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}
