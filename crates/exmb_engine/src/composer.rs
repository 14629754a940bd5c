//! Rendering and posting of the aggregated mirror comment.

use derive_getters::Getters;
use exmb_core::{MirrorResultSet, MirrorStatus, Post};
use exmb_error::ExmbResult;
use exmb_interface::{CommentLedger, FeedSource};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Longest failure reason quoted in a comment.
pub const MAX_REASON_CHARS: usize = 100;

fn default_bot_name() -> String {
    "exmb".to_string()
}

fn default_project_link() -> String {
    "https://github.com/eXhumer/exmb".to_string()
}

fn default_contact_user() -> String {
    "ContentPuff".to_string()
}

fn default_moderator_account() -> String {
    "AutoModerator".to_string()
}

/// Comment footer and parent selection settings.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ComposerConfig {
    /// Name shown in the attribution footer.
    #[builder(default = "default_bot_name()")]
    #[serde(default = "default_bot_name")]
    bot_name: String,
    /// Link behind the bot name.
    #[builder(default = "default_project_link()")]
    #[serde(default = "default_project_link")]
    project_link: String,
    /// Account that receives issue reports.
    #[builder(default = "default_contact_user()")]
    #[serde(default = "default_contact_user")]
    contact_user: String,
    /// Moderation bot whose pinned comment becomes the reply parent.
    #[builder(default = "default_moderator_account()")]
    #[serde(default = "default_moderator_account")]
    moderator_account: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            project_link: default_project_link(),
            contact_user: default_contact_user(),
            moderator_account: default_moderator_account(),
        }
    }
}

/// Turns a [`MirrorResultSet`] into one reply per post.
pub struct CommentComposer {
    feed: Arc<dyn FeedSource>,
    config: ComposerConfig,
    ledger: Option<Arc<dyn CommentLedger>>,
    published: HashSet<String>,
}

impl CommentComposer {
    /// Create a composer replying through `feed`.
    pub fn new(feed: Arc<dyn FeedSource>, config: ComposerConfig) -> Self {
        Self {
            feed,
            config,
            ledger: None,
            published: HashSet::new(),
        }
    }

    /// Consult and update `ledger` so posts are never commented on twice across runs.
    pub fn with_ledger(mut self, ledger: Arc<dyn CommentLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Settings in use.
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Whether `post_full_name` was commented on during this run.
    pub fn is_published(&self, post_full_name: &str) -> bool {
        self.published.contains(post_full_name)
    }

    /// Markdown body for `results`, or `None` when there is nothing to list.
    pub fn render(&self, post: &Post, results: &MirrorResultSet) -> Option<String> {
        if results.is_empty() {
            return None;
        }

        let mut bullets = Vec::with_capacity(results.len());
        let mut references = Vec::with_capacity(results.len() + 2);

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for outcome in results.outcomes() {
            let host = outcome.target().host().as_str();
            let label = host_label(host);
            let count = seen.entry(host).or_default();
            *count += 1;
            // Repeated hosts need distinct reference labels.
            let key = match *count {
                1 => host.to_string(),
                n => format!("{host}-{n}"),
            };
            match outcome.status() {
                MirrorStatus::Succeeded(url) => {
                    bullets.push(format!("* [{label}][{key}]"));
                    references.push(format!("[{key}]: {url}"));
                }
                MirrorStatus::SkippedTooLarge => {
                    bullets.push(format!("* {label}: Failed as video file too large for host"));
                }
                MirrorStatus::Failed(reason) => {
                    bullets.push(format!("* {label}: Failed ({})", short_reason(reason)));
                }
            }
        }

        references.push(format!("[project-link]: {}", self.config.project_link));
        references.push(format!(
            "[contact-link]: https://www.reddit.com/message/compose?to=%2Fu%2F{}&subject=Issue%20with%20mirrors%20in%20post%20{}",
            self.config.contact_user,
            post.full_name()
        ));

        let footer = format!(
            "^Powered ^by ^[{}][project-link] ^| [^(Contact author incase of issue with mirrors)][contact-link]",
            self.config.bot_name
        );

        let mut sections = vec!["**Mirrors**".to_string()];
        sections.extend(bullets);
        sections.push("---".to_string());
        sections.push(footer);
        sections.push(references.join("\n"));
        Some(sections.join("\n\n"))
    }

    /// Full name to reply to: the pinned moderation-bot comment if there is one,
    /// otherwise the post.
    #[tracing::instrument(skip(self, post), fields(post = %post.full_name()))]
    pub async fn resolve_parent(&self, post: &Post) -> ExmbResult<String> {
        let comments = self.feed.comments(post, 1).await?;
        match comments.first() {
            Some(comment) if comment.is_pinned_by(&self.config.moderator_account) => {
                tracing::debug!(parent = %comment.full_name(), "Replying to pinned moderator comment");
                Ok(comment.full_name().clone())
            }
            _ => Ok(post.full_name().clone()),
        }
    }

    /// Post the mirror comment for `post`.
    ///
    /// Returns the new comment's full name, or `None` when nothing was posted:
    /// no outcomes, no successful mirror, or the post was already handled.
    #[tracing::instrument(skip(self, post, results), fields(post = %post.full_name()))]
    pub async fn publish(&mut self, post: &Post, results: &MirrorResultSet) -> ExmbResult<Option<String>> {
        let post_name = post.full_name();

        if self.published.contains(post_name) {
            tracing::debug!("Already commented this run");
            return Ok(None);
        }
        if let Some(ledger) = &self.ledger {
            if ledger.contains(post_name).await? {
                tracing::info!("Ledger already lists a comment for post");
                self.published.insert(post_name.clone());
                return Ok(None);
            }
        }
        if !results.any_succeeded() {
            tracing::info!(targets = results.len(), "No mirror succeeded, not commenting");
            return Ok(None);
        }
        let Some(body) = self.render(post, results) else {
            return Ok(None);
        };

        let parent = self.resolve_parent(post).await?;
        let comment = self.feed.post_comment(&parent, &body).await?;
        self.published.insert(post_name.clone());
        tracing::info!(parent = %parent, comment = %comment, "Posted mirror comment");

        if let Some(ledger) = &self.ledger {
            if let Err(e) = ledger.record(post_name, &comment).await {
                tracing::warn!(error = %e, "Failed to record comment in ledger");
            }
        }

        Ok(Some(comment))
    }
}

/// First line of `reason`, cut to [`MAX_REASON_CHARS`].
fn short_reason(reason: &str) -> String {
    let line = reason.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= MAX_REASON_CHARS {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(MAX_REASON_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Display label for a host id: `streamja` becomes `Streamja`.
fn host_label(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
