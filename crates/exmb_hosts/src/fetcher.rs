//! Downloads resolved media into memory.

use crate::http::{ensure_success, transport};
use async_trait::async_trait;
use exmb_core::MediaBlob;
use exmb_error::HostResult;
use exmb_interface::MediaFetcher;
use reqwest::Client;
use tracing::{debug, instrument};

/// [`MediaFetcher`] over plain HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpMediaFetcher {
    client: Client,
}

impl HttpMediaFetcher {
    /// Create a fetcher using `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, direct_url: &str, filename: &str) -> HostResult<MediaBlob> {
        let response = self.client.get(direct_url).send().await.map_err(transport)?;
        let bytes = ensure_success(response)
            .await?
            .bytes()
            .await
            .map_err(transport)?;
        debug!(size = bytes.len(), "Fetched media");
        Ok(MediaBlob::new(bytes, filename))
    }
}
