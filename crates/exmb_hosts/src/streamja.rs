//! Streamja adapter.
//!
//! Streamja has no JSON API for reads, so the source side scrapes the `<source>`
//! tag from the video page. A page without one is still processing.

use crate::STREAMJA;
use crate::http::{decode, ensure_success, path_id, transport};
use async_trait::async_trait;
use exmb_core::{HostId, MediaBlob, MediaRef, MirrorStatus, UploadMetadata};
use exmb_error::{HostError, HostErrorKind, HostResult};
use exmb_interface::{MirrorHost, SourceHost};
use regex::Regex;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, instrument};

const PREFIXES: &[&str] = &["https://streamja.com/"];
const BASE: &str = "https://streamja.com";

static SOURCE_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"<source\s+src="([^"]+)""#).ok());

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShortIdResponse {
    status: i64,
    short_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    status: i64,
}

/// Streamja source and mirror host.
#[derive(Debug, Clone)]
pub struct StreamjaHost {
    client: Client,
}

impl StreamjaHost {
    /// Create an adapter using `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Video page HTML, or `None` when the video is gone.
    #[instrument(skip(self))]
    async fn page(&self, short_id: &str) -> HostResult<Option<String>> {
        let response = self
            .client
            .get(format!("{}/{}", BASE, short_id))
            .send()
            .await
            .map_err(transport)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let html = ensure_success(response).await?.text().await.map_err(transport)?;
        Ok(Some(html))
    }

    async fn existing_page(&self, media: &MediaRef) -> HostResult<String> {
        self.page(&media.0)
            .await?
            .ok_or_else(|| HostError::new(HostErrorKind::NotFound(media.0.clone())))
    }
}

#[async_trait]
impl SourceHost for StreamjaHost {
    fn id(&self) -> HostId {
        HostId::new(STREAMJA)
    }

    fn url_prefixes(&self) -> &[&'static str] {
        PREFIXES
    }

    fn media_ref(&self, url: &str) -> Option<MediaRef> {
        path_id(url, PREFIXES[0], &["embed/"]).map(|id| MediaRef(id.to_string()))
    }

    async fn is_available(&self, media: &MediaRef) -> HostResult<bool> {
        Ok(self.page(&media.0).await?.is_some())
    }

    async fn is_processing(&self, media: &MediaRef) -> HostResult<bool> {
        let html = self.existing_page(media).await?;
        Ok(extract_source(&html).is_none())
    }

    async fn resolve_direct_url(&self, media: &MediaRef) -> HostResult<String> {
        let html = self.existing_page(media).await?;
        extract_source(&html).ok_or_else(|| {
            HostError::new(HostErrorKind::Upstream(format!(
                "Streamja video {} has no source yet",
                media
            )))
        })
    }
}

#[async_trait]
impl MirrorHost for StreamjaHost {
    fn id(&self) -> HostId {
        HostId::new(STREAMJA)
    }

    #[instrument(skip(self, blob, _metadata), fields(size = blob.len()))]
    async fn upload(&self, blob: &MediaBlob, _metadata: &UploadMetadata) -> HostResult<MirrorStatus> {
        let response = self
            .client
            .post(format!("{}/shortId.php", BASE))
            .form(&[("new", "1")])
            .send()
            .await
            .map_err(transport)?;
        let reservation: ShortIdResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(decode)?;
        let Some(short_id) = reservation.short_id.filter(|_| reservation.status == 1) else {
            return Ok(MirrorStatus::Failed(format!(
                "Streamja refused to reserve an id (status {})",
                reservation.status
            )));
        };
        debug!(short_id = %short_id, "Reserved Streamja id");

        let part = Part::bytes(blob.data().to_vec())
            .file_name(blob.filename().clone())
            .mime_str("video/mp4")
            .map_err(transport)?;
        let response = self
            .client
            .post(format!("{}/upload.php", BASE))
            .query(&[("shortId", short_id.as_str())])
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(transport)?;
        let upload: UploadResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(decode)?;
        if upload.status != 1 {
            return Ok(MirrorStatus::Failed(format!(
                "Streamja rejected upload (status {})",
                upload.status
            )));
        }

        Ok(MirrorStatus::Succeeded(format!("{}/{}", BASE, short_id)))
    }
}

/// Direct video URL from a Streamja page.
fn extract_source(html: &str) -> Option<String> {
    let regex = SOURCE_TAG.as_ref()?;
    let src = regex.captures(html)?.get(1)?.as_str();
    Some(if src.starts_with('/') {
        format!("{}{}", BASE, src)
    } else {
        src.to_string()
    })
}
