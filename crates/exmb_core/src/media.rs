//! Media identifiers and payloads.

use bytes::Bytes;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Filename used for uploads when the source gives none.
pub const DEFAULT_FILENAME: &str = "Mirror.mp4";

/// Identifier of a registered video host (e.g. `streamable`).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("{}", _0)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    /// Create a host id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Host-local media identifier parsed from a source URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{}", _0)]
pub struct MediaRef(pub String);

/// Fetched media bytes, shared across every mirror target of one post.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MediaBlob {
    /// Raw bytes.
    data: Bytes,
    /// Filename to present to upload endpoints.
    filename: String,
}

impl MediaBlob {
    /// Wrap fetched bytes.
    pub fn new(data: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            filename: filename.into(),
        }
    }

    /// Size in bytes, compared against target ceilings.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether the blob holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Descriptive fields sent along with an upload.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct UploadMetadata {
    /// Title for the mirrored clip.
    title: String,
    /// Direct URL of the source media, for hosts that import by URL.
    source_url: String,
    /// Full name of the post being mirrored.
    #[builder(default)]
    post_full_name: Option<String>,
}

impl UploadMetadata {
    /// Metadata for mirroring a post.
    pub fn for_post(
        title: impl Into<String>,
        source_url: impl Into<String>,
        post_full_name: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            post_full_name: Some(post_full_name.into()),
        }
    }
}
