use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use url::Url;

use super::{Collection, ProviderError, ResourceProvider};
use crate::store::ListQuery;

/// Client for a remote record store speaking the `/api` REST surface.
#[derive(Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    base: Url,
}

impl HttpProvider {
    /// `base_url` points at the collection root, e.g. `http://host:8080/api`.
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn collection_url(&self, collection: Collection) -> Result<Url, ProviderError> {
        Ok(self.base.join(collection.as_str())?)
    }

    fn record_url(&self, collection: Collection, id: u64) -> Result<Url, ProviderError> {
        Ok(self.base.join(&format!("{}/{}", collection.as_str(), id))?)
    }
}

/// Turn non-2xx responses into errors; a 404 on a record URL is `NotFound`.
async fn check(
    response: Response,
    collection: Collection,
    id: Option<u64>,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(ProviderError::NotFound { collection, id });
        }
    }

    let message = response.text().await.unwrap_or_default();
    tracing::warn!(
        "Resource provider returned {} for {}: {}",
        status,
        collection,
        message
    );
    Err(ProviderError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ResourceProvider for HttpProvider {
    async fn list(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<Value>, ProviderError> {
        let response = self
            .client
            .get(self.collection_url(collection)?)
            .query(&query.to_pairs())
            .send()
            .await?;
        let response = check(response, collection, None).await?;
        Ok(response.json().await?)
    }

    async fn get(&self, collection: Collection, id: u64) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(self.record_url(collection, id)?)
            .send()
            .await?;
        let response = check(response, collection, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, collection: Collection, record: Value) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(self.collection_url(collection)?)
            .json(&record)
            .send()
            .await?;
        let response = check(response, collection, None).await?;
        Ok(response.json().await?)
    }

    async fn replace(
        &self,
        collection: Collection,
        id: u64,
        record: Value,
    ) -> Result<Value, ProviderError> {
        let response = self
            .client
            .put(self.record_url(collection, id)?)
            .json(&record)
            .send()
            .await?;
        let response = check(response, collection, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, collection: Collection, id: u64) -> Result<(), ProviderError> {
        let response = self
            .client
            .delete(self.record_url(collection, id)?)
            .send()
            .await?;
        check(response, collection, Some(id)).await?;
        Ok(())
    }
}
