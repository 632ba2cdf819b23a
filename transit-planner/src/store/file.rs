//! Store persisted as one JSON object on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use super::{KeyValueStore, StoreError};

/// JSON-file-backed store.
///
/// The whole map is kept in memory; every write rewrites the file through a
/// temporary sibling and a rename, so readers of the file never see a
/// partial write.
#[derive(Debug, Clone)]
pub struct FileStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        info!(path = %path.display(), keys = entries.len(), "opened file store");

        Ok(Self {
            inner: Arc::new(Inner {
                path,
                entries: Mutex::new(entries),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let path = &self.inner.path;
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.inner.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.inner.entries.lock().await;
        let previous = entries.insert(key.to_string(), value);
        if let Err(e) = self.persist(&entries).await {
            // Keep memory and disk in step
            match previous {
                Some(v) => entries.insert(key.to_string(), v),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.inner.entries.lock().await;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&entries).await {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
