//! Streamable adapter.

use crate::STREAMABLE;
use crate::http::{decode, ensure_success, path_id, transport};
use async_trait::async_trait;
use exmb_core::{HostId, MediaBlob, MediaRef, MirrorStatus, UploadMetadata};
use exmb_error::{HostError, HostErrorKind, HostResult};
use exmb_interface::{MirrorHost, SourceHost};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

const PREFIXES: &[&str] = &["https://streamable.com/"];
const API_BASE: &str = "https://api.streamable.com";
const PUBLIC_BASE: &str = "https://streamable.com";

/// Account used for imports. Anonymous imports are allowed but expire.
#[derive(Debug, Clone)]
pub struct StreamableCredentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct VideoStatus {
    status: i64,
    #[serde(default)]
    files: Option<VideoFiles>,
}

#[derive(Debug, Deserialize)]
struct VideoFiles {
    mp4: Option<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImportResponse {
    shortcode: String,
}

impl VideoStatus {
    const PROCESSING: [i64; 2] = [0, 1];
    const READY: i64 = 2;
    const ERROR: i64 = 3;

    fn mp4_url(&self) -> Option<String> {
        let url = self.files.as_ref()?.mp4.as_ref()?.url.as_ref()?;
        Some(match url.strip_prefix("//") {
            Some(rest) => format!("https://{}", rest),
            None => url.clone(),
        })
    }
}

/// Streamable source and mirror host.
#[derive(Debug, Clone)]
pub struct StreamableHost {
    client: Client,
    credentials: Option<StreamableCredentials>,
}

impl StreamableHost {
    /// Create an adapter using `client`.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            credentials: None,
        }
    }

    /// Import into an account instead of anonymously.
    pub fn with_credentials(mut self, credentials: Option<StreamableCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// `None` when the video does not exist.
    #[instrument(skip(self))]
    async fn video_status(&self, shortcode: &str) -> HostResult<Option<VideoStatus>> {
        let url = format!("{}/videos/{}", API_BASE, shortcode);
        let response = self.client.get(&url).send().await.map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status: VideoStatus = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(decode)?;
        debug!(status = status.status, "Streamable video status");
        Ok(Some(status))
    }
}

#[async_trait]
impl SourceHost for StreamableHost {
    fn id(&self) -> HostId {
        HostId::new(STREAMABLE)
    }

    fn url_prefixes(&self) -> &[&'static str] {
        PREFIXES
    }

    fn media_ref(&self, url: &str) -> Option<MediaRef> {
        parse_shortcode(url).map(|code| MediaRef(code.to_string()))
    }

    async fn is_available(&self, media: &MediaRef) -> HostResult<bool> {
        Ok(self
            .video_status(&media.0)
            .await?
            .is_some_and(|v| v.status != VideoStatus::ERROR))
    }

    async fn is_processing(&self, media: &MediaRef) -> HostResult<bool> {
        match self.video_status(&media.0).await? {
            Some(video) => Ok(VideoStatus::PROCESSING.contains(&video.status)),
            None => Err(HostError::new(HostErrorKind::NotFound(media.0.clone()))),
        }
    }

    async fn resolve_direct_url(&self, media: &MediaRef) -> HostResult<String> {
        let video = self
            .video_status(&media.0)
            .await?
            .ok_or_else(|| HostError::new(HostErrorKind::NotFound(media.0.clone())))?;
        if video.status != VideoStatus::READY {
            return Err(HostError::new(HostErrorKind::Upstream(format!(
                "Streamable video {} not ready (status {})",
                media, video.status
            ))));
        }
        video.mp4_url().ok_or_else(|| {
            HostError::new(HostErrorKind::Upstream(format!(
                "Streamable video {} has no mp4 rendition",
                media
            )))
        })
    }
}

#[async_trait]
impl MirrorHost for StreamableHost {
    fn id(&self) -> HostId {
        HostId::new(STREAMABLE)
    }

    #[instrument(skip(self, _blob, metadata), fields(title = %metadata.title()))]
    async fn upload(&self, _blob: &MediaBlob, metadata: &UploadMetadata) -> HostResult<MirrorStatus> {
        let mut request = self.client.get(format!("{}/import", API_BASE)).query(&[
            ("url", metadata.source_url().as_str()),
            ("title", metadata.title().as_str()),
        ]);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.email, Some(&credentials.password));
        }

        let response = request.send().await.map_err(transport)?;
        let response = match ensure_success(response).await {
            Ok(response) => response,
            Err(e) if matches!(e.kind, HostErrorKind::UnexpectedResponse { .. }) => {
                return Ok(MirrorStatus::Failed(e.kind.to_string()));
            }
            Err(e) => return Err(e),
        };
        let import: ImportResponse = response.json().await.map_err(decode)?;
        debug!(shortcode = %import.shortcode, "Streamable import accepted");
        Ok(MirrorStatus::Succeeded(format!("{}/{}", PUBLIC_BASE, import.shortcode)))
    }
}

fn parse_shortcode(url: &str) -> Option<&str> {
    PREFIXES
        .iter()
        .find_map(|prefix| path_id(url, prefix, &["e/", "o/", "s/"]))
}
