//! String key-value storage behind the route cache and favorites.
//!
//! Two backends: an in-process bounded store and a JSON file that survives
//! restarts. Both are cheap to clone and share their contents between clones.

mod file;
mod memory;

use std::future::Future;
use std::path::PathBuf;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors from a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of strings
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to encode the contents for writing
    #[error("failed to encode store contents: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backend refused the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Async string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Insert or overwrite `key`.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete `key`; deleting a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// The backend selected at startup.
#[derive(Debug, Clone)]
pub enum Store {
    Memory(MemoryStore),
    File(FileStore),
}

impl KeyValueStore for Store {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Store::Memory(s) => s.get(key).await,
            Store::File(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.set(key, value).await,
            Store::File(s) => s.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Store::Memory(s) => s.remove(key).await,
            Store::File(s) => s.remove(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatches_to_backend() {
        let dir = tempfile::tempdir().unwrap();
        let stores = [
            Store::Memory(MemoryStore::new(16)),
            Store::File(FileStore::open(dir.path().join("store.json")).await.unwrap()),
        ];

        for store in stores {
            store.set("k", "v".to_string()).await.unwrap();
            assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
            store.remove("k").await.unwrap();
            assert_eq!(store.get("k").await.unwrap(), None);
        }
    }
}
