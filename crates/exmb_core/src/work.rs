//! Orchestration state for one post.

use crate::Post;
use chrono::{DateTime, Utc};
use derive_getters::Getters;

/// In-flight mirroring task for one [`Post`].
///
/// `next_eligible` never moves backwards once set.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct WorkItem {
    /// Post being mirrored.
    post: Post,
    /// Number of "still processing" retries so far.
    attempt_count: u32,
    /// Earliest time the item may be dispatched again.
    next_eligible: Option<DateTime<Utc>>,
    /// Direct media URL once resolved.
    resolved: Option<String>,
}

impl WorkItem {
    /// Fresh item with no attempts recorded.
    pub fn new(post: Post) -> Self {
        Self {
            post,
            attempt_count: 0,
            next_eligible: None,
            resolved: None,
        }
    }

    /// Whether the retry budget is spent.
    pub fn is_exhausted(&self, max_attempts: u32) -> bool {
        self.attempt_count >= max_attempts
    }

    /// Whether the item must still wait at `now`.
    pub fn is_waiting(&self, now: DateTime<Utc>) -> bool {
        self.next_eligible.is_some_and(|at| at > now)
    }

    /// Record one more attempt and wait until `until`.
    ///
    /// An earlier `until` than the current eligibility is ignored.
    pub fn defer(&mut self, until: DateTime<Utc>) {
        self.attempt_count = self.attempt_count.saturating_add(1);
        self.next_eligible = Some(match self.next_eligible {
            Some(current) if current > until => current,
            _ => until,
        });
    }

    /// Mark resolved with the direct media URL.
    pub fn resolve(&mut self, direct_url: impl Into<String>) {
        self.resolved = Some(direct_url.into());
    }

    /// Consume the item, returning the post.
    pub fn into_post(self) -> Post {
        self.post
    }
}
