//! Fan-out of one blob to every mirror target.

use crate::HostRegistry;
use exmb_core::{
    MediaBlob, MirrorOutcome, MirrorResultSet, MirrorStatus, MirrorTarget, Post, UploadMetadata,
};
use exmb_error::HostErrorKind;
use std::sync::Arc;

/// Uploads media to the configured targets, in order.
///
/// Targets are independent: a failure on one never changes another's outcome.
#[derive(Debug, Clone)]
pub struct MirrorAggregator {
    registry: Arc<HostRegistry>,
    targets: Vec<MirrorTarget>,
}

impl MirrorAggregator {
    /// Create an aggregator for `targets`.
    pub fn new(registry: Arc<HostRegistry>, targets: Vec<MirrorTarget>) -> Self {
        Self { registry, targets }
    }

    /// Configured targets.
    pub fn targets(&self) -> &[MirrorTarget] {
        &self.targets
    }

    /// Mirror `blob` for `post` to every target.
    #[tracing::instrument(skip(self, blob), fields(post = %post.full_name(), size = blob.len()))]
    pub async fn mirror(&self, post: &Post, direct_url: &str, blob: &MediaBlob) -> MirrorResultSet {
        let mut results = MirrorResultSet::new(post.full_name().clone());
        let metadata = UploadMetadata::for_post(post.title(), direct_url, post.full_name());

        for target in &self.targets {
            let status = if !target.accepts(blob.len()) {
                tracing::info!(
                    host = %target.host(),
                    max_size = target.max_size(),
                    "Media too large for host, skipping"
                );
                MirrorStatus::SkippedTooLarge
            } else if let Some(host) = self.registry.mirror(target.host()) {
                match host.upload(blob, &metadata).await {
                    Ok(status) => status,
                    Err(e) => {
                        tracing::warn!(host = %target.host(), error = %e.kind, "Mirror upload failed");
                        MirrorStatus::Failed(failure_reason(&e.kind))
                    }
                }
            } else {
                tracing::warn!(host = %target.host(), "No mirror adapter registered");
                MirrorStatus::Failed(format!("no adapter registered for {}", target.host()))
            };

            tracing::info!(host = %target.host(), status = %status, "Mirror outcome");
            results.push(MirrorOutcome::new(target.clone(), status));
        }

        results
    }
}

/// Public reason for a failed upload; response bodies stay in the logs.
fn failure_reason(kind: &HostErrorKind) -> String {
    match kind {
        HostErrorKind::UnexpectedResponse { status, .. } => {
            format!("Unexpected response ({status})")
        }
        other => other.to_string(),
    }
}
