//! Discovery cursor with rollback over previously seen posts.

use crate::HostRegistry;
use derive_getters::Getters;
use exmb_core::{CursorStack, Post};
use exmb_error::{FeedError, FeedErrorKind, FeedResult};
use exmb_interface::FeedSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn default_limit() -> u32 {
    100
}

fn default_moderator_account() -> String {
    "AutoModerator".to_string()
}

/// Discovery settings for one channel.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct DiscoveryConfig {
    /// Channel (subreddit) to watch.
    channel: String,
    /// Page size for each poll.
    #[builder(default = "default_limit()")]
    #[serde(default = "default_limit")]
    limit: u32,
    /// Require a pinned moderation-bot comment before mirroring.
    #[builder(default)]
    #[serde(default)]
    strict_moderator_filter: bool,
    /// Account name of the moderation bot.
    #[builder(default = "default_moderator_account()")]
    #[serde(default = "default_moderator_account")]
    moderator_account: String,
    /// Maximum rollback entries kept; unbounded when unset.
    #[builder(default)]
    #[serde(default)]
    cursor_stack_capacity: Option<usize>,
}

/// Tracks the newest seen post and finds new ones.
///
/// The cursor is the full name of the newest post already handled. Every
/// retained post is pushed onto a [`CursorStack`] so the cursor can roll back
/// when the post it points at gets deleted.
pub struct DiscoveryCursor {
    feed: Arc<dyn FeedSource>,
    registry: Arc<HostRegistry>,
    config: DiscoveryConfig,
    cursor: Option<String>,
    stack: CursorStack,
}

impl DiscoveryCursor {
    /// Create a cursor with no starting point; the first [`recover`](Self::recover)
    /// bootstraps it from the feed.
    pub fn new(
        feed: Arc<dyn FeedSource>,
        registry: Arc<HostRegistry>,
        config: DiscoveryConfig,
    ) -> Self {
        let stack = match config.cursor_stack_capacity {
            Some(capacity) => CursorStack::with_capacity(capacity),
            None => CursorStack::new(),
        };
        Self {
            feed,
            registry,
            config,
            cursor: None,
            stack,
        }
    }

    /// Start from a known post.
    pub fn with_cursor(mut self, before: Option<String>) -> Self {
        self.cursor = before;
        self
    }

    /// Seed the rollback stack, oldest first.
    pub fn with_stack(mut self, stack: CursorStack) -> Self {
        self.stack = stack;
        self
    }

    /// Current cursor.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Rollback stack.
    pub fn stack(&self) -> &CursorStack {
        &self.stack
    }

    /// Settings in use.
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Point the cursor at the channel's newest post.
    #[tracing::instrument(skip(self), fields(channel = %self.config.channel))]
    pub async fn bootstrap(&mut self) -> FeedResult<String> {
        let newest = self
            .feed
            .list_new(&self.config.channel, None, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| FeedError::new(FeedErrorKind::EmptyFeed(self.config.channel.clone())))?;

        let name = newest.full_name().clone();
        tracing::info!(cursor = %name, "Bootstrapped cursor from newest post");
        self.cursor = Some(name.clone());
        Ok(name)
    }

    /// Whether `full_name` is removed, deleted, or no longer known to the feed.
    #[tracing::instrument(skip(self))]
    pub async fn is_deleted(&self, full_name: &str) -> FeedResult<bool> {
        let posts = self.feed.post_info(&[full_name.to_string()]).await?;
        let deleted = match posts.iter().find(|p| p.full_name() == full_name) {
            Some(post) => post.is_removed(),
            None => true,
        };
        tracing::debug!(deleted, "Checked cursor post");
        Ok(deleted)
    }

    /// Replace a deleted cursor with the newest surviving stack entry.
    ///
    /// Returns `true` when the cursor changed. Bootstraps when no cursor is set
    /// or the stack runs dry.
    #[tracing::instrument(skip(self), fields(cursor = ?self.cursor))]
    pub async fn recover(&mut self) -> FeedResult<bool> {
        let Some(current) = self.cursor.clone() else {
            self.bootstrap().await?;
            return Ok(true);
        };

        if !self.is_deleted(&current).await? {
            return Ok(false);
        }
        tracing::info!(cursor = %current, "Cursor post was removed, rolling back");

        while let Some(candidate) = self.stack.pop() {
            if candidate == current {
                continue;
            }
            if self.is_deleted(&candidate).await? {
                tracing::debug!(candidate = %candidate, "Discarding deleted stack entry");
                continue;
            }
            tracing::info!(cursor = %candidate, "Rolled cursor back");
            self.stack.push(candidate.clone());
            self.cursor = Some(candidate);
            return Ok(true);
        }

        tracing::info!("Rollback stack exhausted");
        self.cursor = None;
        self.bootstrap().await?;
        Ok(true)
    }

    /// Fetch posts newer than the cursor and return the eligible ones, oldest first.
    #[tracing::instrument(skip(self), fields(channel = %self.config.channel, cursor = ?self.cursor))]
    pub async fn advance(&mut self) -> FeedResult<Vec<Post>> {
        let mut posts = self
            .feed
            .list_new(
                &self.config.channel,
                self.cursor.as_deref(),
                self.config.limit,
            )
            .await?;

        let Some(newest) = posts.first().map(|p| p.full_name().clone()) else {
            tracing::debug!("No new posts");
            return Ok(Vec::new());
        };

        posts.reverse();
        let retained = self.select(posts).await?;
        self.cursor = Some(newest);
        for post in &retained {
            self.stack.push(post.full_name().clone());
        }

        tracing::info!(
            retained = retained.len(),
            cursor = ?self.cursor,
            "Advanced cursor"
        );
        Ok(retained)
    }

    /// Look up posts by full name. Returns the found posts and the names the feed
    /// did not return.
    #[tracing::instrument(skip(self, full_names), fields(count = full_names.len()))]
    pub async fn lookup(&self, full_names: &[String]) -> FeedResult<(Vec<Post>, Vec<String>)> {
        let posts = self.feed.post_info(full_names).await?;
        let not_found = full_names
            .iter()
            .filter(|name| !posts.iter().any(|p| p.full_name() == *name))
            .cloned()
            .collect();
        Ok((posts, not_found))
    }

    /// Keep the posts that pass the host and moderation filters, preserving order.
    pub async fn select(&self, posts: Vec<Post>) -> FeedResult<Vec<Post>> {
        let mut retained = Vec::with_capacity(posts.len());
        for post in posts {
            if self.is_eligible(&post).await? {
                retained.push(post);
            }
        }
        Ok(retained)
    }

    async fn is_eligible(&self, post: &Post) -> FeedResult<bool> {
        if post.is_removed() {
            tracing::debug!(post = %post.full_name(), "Skipping removed post");
            return Ok(false);
        }

        if !self.registry.supports(post.source_url()) {
            tracing::debug!(
                post = %post.full_name(),
                url = %post.source_url(),
                "Skipping post with unsupported media"
            );
            return Ok(false);
        }

        if !self.config.strict_moderator_filter {
            return Ok(true);
        }

        let comments = self.feed.comments(post, 1).await?;
        let pinned = comments
            .first()
            .is_some_and(|c| c.is_pinned_by(&self.config.moderator_account));
        if !pinned {
            tracing::debug!(
                post = %post.full_name(),
                "Skipping post without pinned moderator comment"
            );
        }
        Ok(pinned)
    }
}
