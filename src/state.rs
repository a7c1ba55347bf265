use std::sync::Arc;

use crate::booking::BookingService;
use crate::config::Config;
use crate::provider::{HttpProvider, LocalProvider, ResourceProvider};
use crate::store::JsonStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking: BookingService,
    /// Present when this process owns the data file.
    pub store: Option<Arc<JsonStore>>,
}

impl AppState {
    /// Open the local store and pick the provider the pages talk to.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let store = if config.store.serve_api || !config.uses_remote_provider() {
            Some(Arc::new(JsonStore::open(config.store_path()).await?))
        } else {
            None
        };

        let provider: Arc<dyn ResourceProvider> = match (&config.provider.base_url, &store) {
            (Some(url), _) => {
                tracing::info!("Using remote resource provider at {}", url);
                Arc::new(HttpProvider::new(url)?)
            }
            (None, Some(store)) => Arc::new(LocalProvider::new(store.clone())),
            (None, None) => anyhow::bail!("no resource provider configured"),
        };

        let booking = BookingService::new(provider, config.booking.page_size);

        Ok(Self {
            config,
            booking,
            store,
        })
    }
}
