//! Feed snapshots.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of one feed submission.
///
/// # Examples
///
/// ```
/// use exmb_core::PostBuilder;
///
/// let post = PostBuilder::default()
///     .id("abc")
///     .full_name("t3_abc")
///     .title("Lap 1 incident")
///     .source_url("https://streamable.com/xyz")
///     .channel("formula1")
///     .build()
///     .expect("valid post");
///
/// assert_eq!(post.full_name(), "t3_abc");
/// assert!(!post.is_removed());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Getters, Serialize, Deserialize, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct Post {
    /// Short id, unique within the feed.
    id: String,
    /// Stable global identifier (`t3_` + id on Reddit).
    full_name: String,
    /// Submission title.
    title: String,
    /// Link the submission points at.
    source_url: String,
    /// Subreddit or channel the post lives in.
    channel: String,
    /// Set when the feed reports the post removed or deleted.
    #[builder(default)]
    #[serde(default)]
    removed_by_category: Option<String>,
}

impl Post {
    /// Whether the feed reports this post as removed or deleted.
    pub fn is_removed(&self) -> bool {
        self.removed_by_category.is_some()
    }
}

/// First-level comment on a post.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Getters, Serialize, Deserialize, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct Comment {
    /// Short id.
    id: String,
    /// Stable global identifier (`t1_` + id on Reddit).
    full_name: String,
    /// Author account, absent for deleted accounts.
    #[builder(default)]
    #[serde(default)]
    author: Option<String>,
    /// Whether replies are locked.
    #[builder(default)]
    #[serde(default)]
    locked: Option<bool>,
    /// Whether the comment is pinned to the top of the thread.
    #[builder(default)]
    #[serde(default)]
    stickied: Option<bool>,
}

impl Comment {
    /// True when this is an unlocked, stickied comment written by `moderator`.
    ///
    /// Missing fields count as a failed check.
    pub fn is_pinned_by(&self, moderator: &str) -> bool {
        self.author.as_deref() == Some(moderator)
            && self.locked == Some(false)
            && self.stickied == Some(true)
    }
}
