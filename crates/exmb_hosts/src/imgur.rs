//! Imgur adapter. Source only; albums and galleries are not supported.

use crate::IMGUR;
use crate::http::transport;
use async_trait::async_trait;
use exmb_core::{HostId, MediaRef};
use exmb_error::{HostError, HostErrorKind, HostResult};
use exmb_interface::SourceHost;
use reqwest::Client;
use tracing::instrument;

const PREFIXES: &[&str] = &["https://imgur.com/", "https://i.imgur.com/"];

/// Imgur source host.
#[derive(Debug, Clone)]
pub struct ImgurHost {
    client: Client,
}

impl ImgurHost {
    /// Create an adapter using `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn mp4_url(media: &MediaRef) -> String {
        format!("https://i.imgur.com/{}.mp4", media.0)
    }
}

#[async_trait]
impl SourceHost for ImgurHost {
    fn id(&self) -> HostId {
        HostId::new(IMGUR)
    }

    fn url_prefixes(&self) -> &[&'static str] {
        PREFIXES
    }

    fn media_ref(&self, url: &str) -> Option<MediaRef> {
        parse_imgur_id(url).map(|id| MediaRef(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn is_available(&self, media: &MediaRef) -> HostResult<bool> {
        let response = self
            .client
            .head(Self::mp4_url(media))
            .send()
            .await
            .map_err(transport)?;
        Ok(response.status().is_success())
    }

    async fn is_processing(&self, _media: &MediaRef) -> HostResult<bool> {
        Ok(false)
    }

    async fn resolve_direct_url(&self, media: &MediaRef) -> HostResult<String> {
        if media.0.is_empty() {
            return Err(HostError::new(HostErrorKind::Upstream("empty Imgur id".to_string())));
        }
        Ok(Self::mp4_url(media))
    }
}

fn parse_imgur_id(url: &str) -> Option<&str> {
    let rest = PREFIXES.iter().find_map(|p| url.strip_prefix(p))?;
    if rest.starts_with("a/") || rest.starts_with("gallery/") {
        return None;
    }
    let segment = rest.split(['/', '?', '#']).next()?;
    let id = segment.split('.').next()?;
    (!id.is_empty()).then_some(id)
}
