//! Streamff adapter.

use crate::STREAMFF;
use crate::http::{decode, ensure_success, path_id, transport};
use async_trait::async_trait;
use exmb_core::{HostId, MediaBlob, MediaRef, MirrorStatus, UploadMetadata};
use exmb_error::{HostError, HostErrorKind, HostResult};
use exmb_interface::{MirrorHost, SourceHost};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

const PREFIXES: &[&str] = &["https://streamff.com/v/"];
const BASE: &str = "https://streamff.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoInfo {
    #[serde(default)]
    video_link: Option<String>,
}

/// Streamff source and mirror host.
#[derive(Debug, Clone)]
pub struct StreamffHost {
    client: Client,
}

impl StreamffHost {
    /// Create an adapter using `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    async fn video(&self, id: &str) -> HostResult<Option<VideoInfo>> {
        let response = self
            .client
            .get(format!("{}/api/videos/{}", BASE, id))
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let info = ensure_success(response).await?.json().await.map_err(decode)?;
        Ok(Some(info))
    }

    async fn existing_video(&self, media: &MediaRef) -> HostResult<VideoInfo> {
        self.video(&media.0)
            .await?
            .ok_or_else(|| HostError::new(HostErrorKind::NotFound(media.0.clone())))
    }
}

impl VideoInfo {
    fn direct_url(&self) -> Option<String> {
        let link = self.video_link.as_deref().filter(|l| !l.is_empty())?;
        Some(if link.starts_with("http") {
            link.to_string()
        } else {
            format!("{}{}", BASE, link)
        })
    }
}

#[async_trait]
impl SourceHost for StreamffHost {
    fn id(&self) -> HostId {
        HostId::new(STREAMFF)
    }

    fn url_prefixes(&self) -> &[&'static str] {
        PREFIXES
    }

    fn media_ref(&self, url: &str) -> Option<MediaRef> {
        path_id(url, PREFIXES[0], &[]).map(|id| MediaRef(id.to_string()))
    }

    async fn is_available(&self, media: &MediaRef) -> HostResult<bool> {
        Ok(self.video(&media.0).await?.is_some())
    }

    async fn is_processing(&self, media: &MediaRef) -> HostResult<bool> {
        Ok(self.existing_video(media).await?.direct_url().is_none())
    }

    async fn resolve_direct_url(&self, media: &MediaRef) -> HostResult<String> {
        self.existing_video(media).await?.direct_url().ok_or_else(|| {
            HostError::new(HostErrorKind::Upstream(format!(
                "Streamff video {} has no video link yet",
                media
            )))
        })
    }
}

#[async_trait]
impl MirrorHost for StreamffHost {
    fn id(&self) -> HostId {
        HostId::new(STREAMFF)
    }

    #[instrument(skip(self, blob, _metadata), fields(size = blob.len()))]
    async fn upload(&self, blob: &MediaBlob, _metadata: &UploadMetadata) -> HostResult<MirrorStatus> {
        let response = self
            .client
            .post(format!("{}/api/videos/generate-link", BASE))
            .send()
            .await
            .map_err(transport)?;
        let body: serde_json::Value = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(decode)?;
        let Some(id) = generated_id(&body) else {
            return Ok(MirrorStatus::Failed(format!(
                "Streamff returned no link id: {}",
                body
            )));
        };
        debug!(id = %id, "Generated Streamff link");

        let part = Part::bytes(blob.data().to_vec())
            .file_name(blob.filename().clone())
            .mime_str("video/mp4")
            .map_err(transport)?;
        let response = self
            .client
            .post(format!("{}/api/videos/upload/{}", BASE, id))
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await?;

        Ok(MirrorStatus::Succeeded(format!("{}/v/{}", BASE, id)))
    }
}

/// Link id from a generate-link response, which is either a bare string or `{"id": ...}`.
fn generated_id(body: &serde_json::Value) -> Option<String> {
    let id = match body {
        serde_json::Value::String(id) => id.as_str(),
        other => other.get("id")?.as_str()?,
    };
    (!id.is_empty()).then(|| id.to_string())
}
