//! Content feed access.

use async_trait::async_trait;
use exmb_core::{Comment, Post};
use exmb_error::FeedResult;

/// A content feed the bot watches and replies on.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Posts in `channel` strictly newer than `before`, newest first, at most `limit`.
    ///
    /// With no `before`, returns the newest posts.
    async fn list_new(
        &self,
        channel: &str,
        before: Option<&str>,
        limit: u32,
    ) -> FeedResult<Vec<Post>>;

    /// Snapshot of the named posts. Posts the feed no longer knows are omitted.
    async fn post_info(&self, full_names: &[String]) -> FeedResult<Vec<Post>>;

    /// First-level comments on `post`, at most `limit`.
    async fn comments(&self, post: &Post, limit: u32) -> FeedResult<Vec<Comment>>;

    /// Reply to `parent_full_name`, returning the new comment's full name.
    async fn post_comment(&self, parent_full_name: &str, text: &str) -> FeedResult<String>;

    /// Submit a link post, returning its full name.
    async fn submit_link(&self, channel: &str, title: &str, url: &str) -> FeedResult<String>;
}
