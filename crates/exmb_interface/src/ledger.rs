//! Record of posts already commented on.

use async_trait::async_trait;
use exmb_error::StorageError;

/// Persistent set of post full names that already received a mirror comment.
#[async_trait]
pub trait CommentLedger: Send + Sync {
    /// Whether `post_full_name` was recorded.
    async fn contains(&self, post_full_name: &str) -> Result<bool, StorageError>;

    /// Record `post_full_name` with the comment that was posted.
    async fn record(&self, post_full_name: &str, comment_full_name: &str)
    -> Result<(), StorageError>;
}
