//! Video host capabilities.

use async_trait::async_trait;
use exmb_core::{HostId, MediaBlob, MediaRef, MirrorStatus, UploadMetadata};
use exmb_error::HostResult;
use std::time::Duration;

/// Delay before re-checking media that is still processing.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// A host that source media can be resolved from.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Host identifier.
    fn id(&self) -> HostId;

    /// URL prefixes this host claims.
    fn url_prefixes(&self) -> &[&'static str];

    /// Parse a host-local reference from `url`.
    ///
    /// Returns `None` for URL shapes the host does not support.
    fn media_ref(&self, url: &str) -> Option<MediaRef>;

    /// Delay before re-checking processing media.
    fn retry_delay(&self) -> Duration {
        DEFAULT_RETRY_DELAY
    }

    /// Whether `url` starts with one of this host's prefixes.
    fn matches(&self, url: &str) -> bool {
        self.url_prefixes().iter().any(|p| url.starts_with(p))
    }

    /// `false` means the media is gone for good.
    async fn is_available(&self, media: &MediaRef) -> HostResult<bool>;

    /// `true` means the media exists but is not ready yet.
    async fn is_processing(&self, media: &MediaRef) -> HostResult<bool>;

    /// Direct download URL. Only valid once available and not processing.
    async fn resolve_direct_url(&self, media: &MediaRef) -> HostResult<String>;
}

/// A host media can be mirrored to.
#[async_trait]
pub trait MirrorHost: Send + Sync {
    /// Host identifier, matched against configured targets.
    fn id(&self) -> HostId;

    /// Upload `blob`.
    ///
    /// Host-side rejections come back as `Ok(MirrorStatus::Failed(_))`;
    /// transport and auth problems as `Err`.
    async fn upload(&self, blob: &MediaBlob, metadata: &UploadMetadata)
    -> HostResult<MirrorStatus>;
}

/// Downloads resolved media.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch `direct_url` into memory.
    async fn fetch(&self, direct_url: &str, filename: &str) -> HostResult<MediaBlob>;
}
