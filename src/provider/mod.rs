//! Access to the four record collections, either in-process or over HTTP.

pub mod http;
pub mod local;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::store::{ListQuery, StoreError};

pub use http::HttpProvider;
pub use local::LocalProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Departments,
    Doctors,
    Appointments,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Departments => "departments",
            Collection::Doctors => "doctors",
            Collection::Appointments => "appointments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: Collection, id: u64 },

    #[error("Resource provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Resource provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid provider URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

/// Generic CRUD over JSON records. Implementations carry no business rules.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    async fn list(&self, collection: Collection, query: &ListQuery)
        -> Result<Vec<Value>, ProviderError>;

    async fn get(&self, collection: Collection, id: u64) -> Result<Value, ProviderError>;

    async fn create(&self, collection: Collection, record: Value) -> Result<Value, ProviderError>;

    /// Full-record replacement (PUT).
    async fn replace(
        &self,
        collection: Collection,
        id: u64,
        record: Value,
    ) -> Result<Value, ProviderError>;

    async fn delete(&self, collection: Collection, id: u64) -> Result<(), ProviderError>;
}
