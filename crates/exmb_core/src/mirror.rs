//! Mirror targets and per-target outcomes.

use crate::{HostId, MB};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A configured destination host plus its size ceiling.
///
/// # Examples
///
/// ```
/// use exmb_core::MirrorTarget;
///
/// let target = MirrorTarget::from_megabytes("streamja", 30);
/// assert!(target.accepts(30 * 1024 * 1024));
/// assert!(!target.accepts(30 * 1024 * 1024 + 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, Serialize, Deserialize)]
pub struct MirrorTarget {
    /// Destination host.
    host: HostId,
    /// Largest accepted blob, in bytes.
    max_size: u64,
}

impl MirrorTarget {
    /// Create a target with a ceiling in bytes.
    pub fn new(host: impl Into<HostId>, max_size: u64) -> Self {
        Self {
            host: host.into(),
            max_size,
        }
    }

    /// Create a target with a ceiling in mebibytes.
    pub fn from_megabytes(host: impl Into<HostId>, max_size_mb: u64) -> Self {
        Self::new(host, max_size_mb.saturating_mul(MB))
    }

    /// Whether a blob of `size` bytes fits under the ceiling.
    pub fn accepts(&self, size: u64) -> bool {
        size <= self.max_size
    }
}

/// Result of mirroring one blob to one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum MirrorStatus {
    /// Upload finished; holds the public URL.
    #[display("succeeded: {}", _0)]
    Succeeded(String),
    /// Blob exceeded the target's ceiling; no upload attempted.
    #[display("skipped: too large")]
    SkippedTooLarge,
    /// Upload failed.
    #[display("failed: {}", _0)]
    Failed(String),
}

impl MirrorStatus {
    /// URL of a successful mirror.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Succeeded(url) => Some(url),
            _ => None,
        }
    }
}

/// Outcome for a single target.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct MirrorOutcome {
    /// Target the outcome belongs to.
    target: MirrorTarget,
    /// What happened.
    status: MirrorStatus,
}

impl MirrorOutcome {
    /// Pair a target with its status.
    pub fn new(target: MirrorTarget, status: MirrorStatus) -> Self {
        Self { target, status }
    }
}

/// All outcomes for one post, in target order.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct MirrorResultSet {
    /// Full name of the mirrored post.
    post_full_name: String,
    /// Outcomes in configured target order.
    outcomes: Vec<MirrorOutcome>,
}

impl MirrorResultSet {
    /// Start an empty set for a post.
    pub fn new(post_full_name: impl Into<String>) -> Self {
        Self {
            post_full_name: post_full_name.into(),
            outcomes: Vec::new(),
        }
    }

    /// Append an outcome.
    pub fn push(&mut self, outcome: MirrorOutcome) {
        self.outcomes.push(outcome);
    }

    /// Whether no outcome was recorded.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of recorded outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether at least one target succeeded.
    pub fn any_succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.status, MirrorStatus::Succeeded(_)))
    }

    /// Outcome recorded for `host`, if any.
    pub fn get(&self, host: &HostId) -> Option<&MirrorOutcome> {
        self.outcomes.iter().find(|o| o.target.host() == host)
    }
}
