//! Bounded-retry resolution of source media.
//!
//! Each post becomes a [`WorkItem`] in a single FIFO queue:
//!
//! ```text
//! Pending -> Waiting(until) -> Pending | Resolved | Dropped
//! ```
//!
//! Items whose host is still processing are pushed back with a deadline of
//! `now + host.retry_delay()` (or the configured override) until the attempt
//! budget runs out.

use crate::HostRegistry;
use chrono::{DateTime, TimeDelta, Utc};
use derive_getters::Getters;
use exmb_core::{Post, WorkItem};
use exmb_error::HostErrorKind;
use exmb_interface::Clock;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Default retry budget per post.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Counters since the orchestrator was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct OrchestratorStats {
    /// Posts accepted into the queue.
    enqueued: u64,
    /// Items resolved to a direct media URL.
    resolved: u64,
    /// Items removed without resolving.
    dropped: u64,
    /// Re-enqueues caused by media still processing.
    requeued: u64,
}

/// Output of one [`Orchestrator::run_ready`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct ReadyBatch {
    /// Items resolved during the pass.
    resolved: Vec<WorkItem>,
    /// Earliest time a waiting item becomes eligible, if any remain.
    next_wake: Option<DateTime<Utc>>,
}

impl ReadyBatch {
    /// Take the resolved items.
    pub fn into_resolved(self) -> Vec<WorkItem> {
        self.resolved
    }
}

enum Step {
    Resolved(WorkItem),
    Requeued(WorkItem),
    Dropped,
}

/// Single-consumer work queue driving every post to a terminal state.
pub struct Orchestrator {
    registry: Arc<HostRegistry>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
    retry_delay: Option<Duration>,
    queue: VecDeque<WorkItem>,
    stats: OrchestratorStats,
}

impl Orchestrator {
    /// Create an orchestrator with the default attempt budget.
    pub fn new(registry: Arc<HostRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            clock,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: None,
            queue: VecDeque::new(),
            stats: OrchestratorStats::default(),
        }
    }

    /// Override the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Use `delay` between processing checks instead of each host's own delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Attempt budget per post.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Counters.
    pub fn stats(&self) -> OrchestratorStats {
        self.stats
    }

    /// Items still queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued items in order.
    pub fn pending(&self) -> impl Iterator<Item = &WorkItem> {
        self.queue.iter()
    }

    /// Add a post at the tail. Posts already queued are ignored.
    pub fn enqueue(&mut self, post: Post) {
        if self
            .queue
            .iter()
            .any(|item| item.post().full_name() == post.full_name())
        {
            tracing::debug!(post = %post.full_name(), "Post already queued");
            return;
        }
        tracing::debug!(post = %post.full_name(), "Enqueued post");
        self.queue.push_back(WorkItem::new(post));
        self.stats.enqueued += 1;
    }

    /// Process items until the queue is empty or every remaining item is waiting.
    #[tracing::instrument(skip(self), fields(queued = self.queue.len()))]
    pub async fn run_ready(&mut self) -> ReadyBatch {
        let mut resolved = Vec::new();

        while self.has_ready_item() {
            let Some(item) = self.queue.pop_front() else {
                break;
            };

            if item.is_exhausted(self.max_attempts) {
                tracing::warn!(
                    post = %item.post().full_name(),
                    attempts = item.attempt_count(),
                    "Attempt budget spent, dropping post"
                );
                self.stats.dropped += 1;
                continue;
            }

            if item.is_waiting(self.clock.now()) {
                self.queue.push_back(item);
                continue;
            }

            match self.dispatch(item).await {
                Step::Resolved(item) => {
                    self.stats.resolved += 1;
                    resolved.push(item);
                }
                Step::Requeued(item) => {
                    self.stats.requeued += 1;
                    self.queue.push_back(item);
                }
                Step::Dropped => self.stats.dropped += 1,
            }
        }

        let next_wake = self.queue.iter().filter_map(|i| *i.next_eligible()).min();
        tracing::debug!(
            resolved = resolved.len(),
            waiting = self.queue.len(),
            "Ready pass finished"
        );
        ReadyBatch {
            resolved,
            next_wake,
        }
    }

    /// Run passes, sleeping between them, until the queue is empty.
    #[tracing::instrument(skip(self), fields(queued = self.queue.len()))]
    pub async fn run_to_completion(&mut self) -> Vec<WorkItem> {
        let mut resolved = Vec::new();
        loop {
            let batch = self.run_ready().await;
            let next_wake = batch.next_wake;
            resolved.extend(batch.into_resolved());

            match next_wake {
                Some(deadline) => self.clock.sleep_until(deadline).await,
                None if self.queue.is_empty() => break,
                None => continue,
            }
        }
        resolved
    }

    fn has_ready_item(&self) -> bool {
        let now = self.clock.now();
        self.queue
            .iter()
            .any(|item| item.is_exhausted(self.max_attempts) || !item.is_waiting(now))
    }

    #[tracing::instrument(
        skip(self, item),
        fields(post = %item.post().full_name(), attempt = item.attempt_count())
    )]
    async fn dispatch(&self, mut item: WorkItem) -> Step {
        let url = item.post().source_url().clone();
        let Some((host, media)) = self.registry.media_for(&url) else {
            tracing::info!(url = %url, "No host adapter for post media, dropping");
            return Step::Dropped;
        };
        let host = Arc::clone(host);

        match host.is_available(&media).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(host = %host.id(), media = %media, "Media unavailable, dropping");
                return Step::Dropped;
            }
            Err(e) => {
                log_host_drop(&e.kind, "availability check");
                return Step::Dropped;
            }
        }

        let processing = match host.is_processing(&media).await {
            Ok(processing) => processing,
            Err(e) if matches!(e.kind, HostErrorKind::StillProcessing(_)) => true,
            Err(e) => {
                log_host_drop(&e.kind, "processing check");
                return Step::Dropped;
            }
        };

        if processing {
            let delay = self.retry_delay.unwrap_or_else(|| host.retry_delay());
            let delay = TimeDelta::from_std(delay).unwrap_or(TimeDelta::MAX);
            let until = self.clock.now().checked_add_signed(delay).unwrap_or(DateTime::<Utc>::MAX_UTC);
            item.defer(until);
            tracing::info!(
                host = %host.id(),
                media = %media,
                attempt = item.attempt_count(),
                until = %until,
                "Media still processing, retrying later"
            );
            return Step::Requeued(item);
        }

        match host.resolve_direct_url(&media).await {
            Ok(direct_url) => {
                tracing::info!(host = %host.id(), media = %media, "Resolved media");
                item.resolve(direct_url);
                Step::Resolved(item)
            }
            Err(e) => {
                log_host_drop(&e.kind, "resolution");
                Step::Dropped
            }
        }
    }
}

fn log_host_drop(kind: &HostErrorKind, stage: &str) {
    match kind {
        HostErrorKind::NotFound(_) => tracing::debug!(stage, error = %kind, "Media gone, dropping"),
        _ => tracing::warn!(stage, error = %kind, "Host error, dropping post"),
    }
}
