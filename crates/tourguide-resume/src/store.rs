//! Key/value stores backing resume state outside a browser page.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tourguide_protocols::{KeyValueStore, StoreError};
use tracing::{debug, warn};

/// In-memory store for testing and single-process runs.
pub struct MemoryKeyValueStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create a new memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Snapshot of every entry.
    pub async fn entries(&self) -> BTreeMap<String, String> {
        self.entries.read().await.clone()
    }
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// On-disk layout of [`FileKeyValueStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// JSON file backed store.
///
/// The whole map lives in one file:
/// ```text
/// {
///   "entries": { "tourguide-mode": "full", "tourguide-step": "2" },
///   "updated_at": "2026-01-01T00:00:00Z"
/// }
/// ```
pub struct FileKeyValueStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Create a store at `path`, creating parent directories.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        debug!("FileKeyValueStore initialized at {:?}", path);

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored entry, plus the last write time.
    pub async fn snapshot(
        &self,
    ) -> Result<(BTreeMap<String, String>, Option<DateTime<Utc>>), StoreError> {
        let file = self.read_file().await?;
        Ok((file.entries, file.updated_at))
    }

    async fn read_file(&self) -> Result<StoreFile, StoreError> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(StoreFile::default());
        }

        match serde_json::from_str::<StoreFile>(&content) {
            Ok(file) => Ok(file),
            Err(e) => {
                warn!("Discarding unreadable store file {:?}: {}", self.path, e);
                Ok(StoreFile::default())
            }
        }
    }

    async fn write_file(&self, mut file: StoreFile) -> Result<(), StoreError> {
        file.updated_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(&file).map_err(|e| {
            StoreError::Serialization(format!("Failed to serialize store: {}", e))
        })?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let file = self.read_file().await?;
        Ok(file.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read_file().await?;
        file.entries.insert(key.to_string(), value.to_string());
        self.write_file(file).await?;
        debug!("Stored '{}' in {:?}", key, self.path);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read_file().await?;
        if file.entries.remove(key).is_some() {
            self.write_file(file).await?;
            debug!("Removed '{}' from {:?}", key, self.path);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
