//! `{mode, stepIndex}` contract over a key/value store.

use std::sync::Arc;

use tourguide_config::StorageConfig;
use tourguide_protocols::{KeyValueStore, PlaybackMode, StoreError};
use tracing::{debug, warn};

/// Persisted playback position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeState {
    pub mode: PlaybackMode,
    /// Raw stored index. Not bounds-checked; the sequencer clamps it.
    pub step_index: usize,
}

impl ResumeState {
    pub fn new(mode: PlaybackMode, step_index: usize) -> Self {
        Self { mode, step_index }
    }
}

/// Names of the two persisted entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeKeys {
    pub mode: String,
    pub step: String,
}

impl Default for ResumeKeys {
    fn default() -> Self {
        Self::from(&StorageConfig::default())
    }
}

impl From<&StorageConfig> for ResumeKeys {
    fn from(config: &StorageConfig) -> Self {
        Self {
            mode: config.mode_key.clone(),
            step: config.step_key.clone(),
        }
    }
}

/// Reads and writes resume state through any [`KeyValueStore`].
#[derive(Clone)]
pub struct ResumeStore {
    store: Arc<dyn KeyValueStore>,
    keys: ResumeKeys,
}

impl ResumeStore {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: ResumeKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &ResumeKeys {
        &self.keys
    }

    /// Read persisted state.
    ///
    /// Returns `None` unless both entries exist and the mode parses. An
    /// unparseable index reads as `0`.
    pub async fn read(&self) -> Result<Option<ResumeState>, StoreError> {
        let mode = self.store.get(&self.keys.mode).await?;
        let step = self.store.get(&self.keys.step).await?;

        let (Some(mode), Some(step)) = (mode, step) else {
            return Ok(None);
        };

        let mode = match mode.parse::<PlaybackMode>() {
            Ok(mode) => mode,
            Err(e) => {
                warn!("Ignoring persisted resume state: {}", e);
                return Ok(None);
            }
        };

        let step_index = step.trim().parse::<usize>().unwrap_or_else(|_| {
            debug!("Persisted step index '{}' is not a number, using 0", step);
            0
        });

        Ok(Some(ResumeState { mode, step_index }))
    }

    /// Persist both entries.
    pub async fn write(&self, state: ResumeState) -> Result<(), StoreError> {
        self.store.set(&self.keys.mode, state.mode.as_str()).await?;
        self.store
            .set(&self.keys.step, &state.step_index.to_string())
            .await?;
        debug!("Persisted resume state {}:{}", state.mode, state.step_index);
        Ok(())
    }

    /// Remove both entries. Safe to call when nothing is stored.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.keys.mode).await?;
        self.store.remove(&self.keys.step).await?;
        Ok(())
    }

    /// Whether both entries are present, regardless of their values.
    pub async fn is_resumable(&self) -> Result<bool, StoreError> {
        Ok(self.store.get(&self.keys.mode).await?.is_some()
            && self.store.get(&self.keys.step).await?.is_some())
    }
}
