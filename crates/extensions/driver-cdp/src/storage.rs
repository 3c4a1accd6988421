//! `window.localStorage` as the durable key/value store.

use std::sync::Arc;

use async_trait::async_trait;
use tourguide_protocols::{KeyValueStore, StoreError};

use crate::cdp::PageSession;
use crate::scripts;

/// Resume state kept in the page origin's `localStorage`, so it survives
/// the reloads a cross-page step causes.
pub struct LocalStorageStore {
    session: Arc<PageSession>,
}

impl LocalStorageStore {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl KeyValueStore for LocalStorageStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self.session.evaluate(&scripts::storage_get(key)).await?;
        Ok(value.as_str().map(|s| s.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.session
            .evaluate(&scripts::storage_set(key, value))
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.session.evaluate(&scripts::storage_remove(key)).await?;
        Ok(())
    }
}
