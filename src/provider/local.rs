use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::{Collection, ProviderError, ResourceProvider};
use crate::store::{JsonStore, ListQuery, StoreError};

/// Talks to a [`JsonStore`] living in the same process.
#[derive(Clone)]
pub struct LocalProvider {
    store: Arc<JsonStore>,
}

impl LocalProvider {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }
}

fn map_err(collection: Collection, err: StoreError) -> ProviderError {
    match err {
        StoreError::RecordNotFound { id, .. } => ProviderError::NotFound { collection, id },
        other => ProviderError::Store(other),
    }
}

#[async_trait]
impl ResourceProvider for LocalProvider {
    async fn list(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<Value>, ProviderError> {
        self.store
            .list(collection.as_str(), query)
            .await
            .map(|listing| listing.records)
            .map_err(|e| map_err(collection, e))
    }

    async fn get(&self, collection: Collection, id: u64) -> Result<Value, ProviderError> {
        self.store
            .get(collection.as_str(), id)
            .await
            .map_err(|e| map_err(collection, e))
    }

    async fn create(&self, collection: Collection, record: Value) -> Result<Value, ProviderError> {
        self.store
            .insert(collection.as_str(), record)
            .await
            .map_err(|e| map_err(collection, e))
    }

    async fn replace(
        &self,
        collection: Collection,
        id: u64,
        record: Value,
    ) -> Result<Value, ProviderError> {
        self.store
            .replace(collection.as_str(), id, record)
            .await
            .map_err(|e| map_err(collection, e))
    }

    async fn delete(&self, collection: Collection, id: u64) -> Result<(), ProviderError> {
        self.store
            .remove(collection.as_str(), id)
            .await
            .map(|_| ())
            .map_err(|e| map_err(collection, e))
    }
}
