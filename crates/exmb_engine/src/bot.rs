//! Polling loop tying discovery, orchestration, mirroring and commenting together.

use crate::{CommentComposer, DiscoveryCursor, MirrorAggregator, Orchestrator};
use chrono::{DateTime, TimeDelta, Utc};
use derive_getters::Getters;
use exmb_core::{DEFAULT_FILENAME, MirrorResultSet, Post, WorkItem};
use exmb_error::ExmbResult;
use exmb_interface::{Clock, MediaFetcher, Notifier};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default sleep between cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// What one [`MirrorBot::run_cycle`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct CycleReport {
    /// Posts discovered and enqueued.
    discovered: usize,
    /// Posts whose media was resolved and mirrored.
    mirrored: usize,
    /// Full names of posts that received a comment.
    published: Vec<String>,
}

/// The mirroring bot.
///
/// Owns every component and all mutable state; a single task drives it.
///
/// # Examples
///
/// ```no_run
/// # use exmb_engine::MirrorBot;
/// # async fn example(mut bot: MirrorBot) {
/// bot.run(async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await;
/// # }
/// ```
pub struct MirrorBot {
    discovery: DiscoveryCursor,
    orchestrator: Orchestrator,
    aggregator: MirrorAggregator,
    composer: CommentComposer,
    fetcher: Arc<dyn MediaFetcher>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    pending: VecDeque<(Post, MirrorResultSet)>,
}

impl MirrorBot {
    /// Assemble a bot sleeping [`DEFAULT_INTERVAL`] between cycles.
    pub fn new(
        discovery: DiscoveryCursor,
        orchestrator: Orchestrator,
        aggregator: MirrorAggregator,
        composer: CommentComposer,
        fetcher: Arc<dyn MediaFetcher>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            discovery,
            orchestrator,
            aggregator,
            composer,
            fetcher,
            notifier,
            clock,
            interval: DEFAULT_INTERVAL,
            pending: VecDeque::new(),
        }
    }

    /// Override the sleep between cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Discovery component.
    pub fn discovery(&self) -> &DiscoveryCursor {
        &self.discovery
    }

    /// Orchestrator component.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Composer component.
    pub fn composer(&self) -> &CommentComposer {
        &self.composer
    }

    /// Posts mirrored but not yet commented on.
    pub fn pending_comments(&self) -> usize {
        self.pending.len()
    }

    /// One discovery, resolution, mirroring and commenting pass.
    #[tracing::instrument(skip(self), fields(cursor = ?self.discovery.cursor()))]
    pub async fn run_cycle(&mut self) -> ExmbResult<CycleReport> {
        let mut stopping = false;
        self.cycle(&mut std::future::pending::<()>(), &mut stopping)
            .await
    }

    /// A cycle that stops taking new work once `shutdown` completes.
    ///
    /// Posts already resolved when the signal lands are still mirrored and
    /// commented on. `stopping` is set once `shutdown` has completed, after
    /// which it must not be polled again.
    async fn cycle<F>(&mut self, shutdown: &mut F, stopping: &mut bool) -> ExmbResult<CycleReport>
    where
        F: Future<Output = ()> + Unpin,
    {
        self.discovery.recover().await?;
        let posts = self.discovery.advance().await?;
        let discovered = posts.len();

        if discovered > 0 {
            self.notify(&format!("Found new posts {discovered} to mirror!"))
                .await;
        }
        for post in posts {
            self.orchestrator.enqueue(post);
        }

        *stopping = *stopping || has_fired(shutdown).await;
        let resolved = if *stopping {
            tracing::info!(waiting = self.orchestrator.len(), "Shutdown requested, skipping resolution");
            Vec::new()
        } else {
            self.orchestrator.run_ready().await.into_resolved()
        };

        let mirrored = self.mirror_resolved(resolved).await;
        let published = self.flush().await;
        *stopping = *stopping || has_fired(shutdown).await;

        tracing::info!(
            discovered,
            mirrored,
            published = published.len(),
            waiting = self.orchestrator.len(),
            "Cycle finished"
        );
        Ok(CycleReport {
            discovered,
            mirrored,
            published,
        })
    }

    /// Run cycles until `shutdown` completes, then flush pending comments.
    ///
    /// A cycle in progress is never abandoned: once `shutdown` completes no new
    /// posts are resolved, but resolved ones are mirrored and commented on.
    /// Errors inside a cycle are logged and the loop carries on.
    #[tracing::instrument(skip_all)]
    pub async fn run<S>(&mut self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(interval_secs = self.interval.as_secs(), "Bot started");

        let mut stopping = has_fired(&mut shutdown).await;
        while !stopping {
            if let Err(e) = self.cycle(&mut shutdown, &mut stopping).await {
                tracing::error!(error = %e, "Cycle failed");
            }
            if stopping {
                break;
            }

            let secs = self.interval.as_secs();
            self.notify(&format!("Sleeping bot for {secs} seconds!"))
                .await;

            let delay = TimeDelta::from_std(self.interval).unwrap_or(TimeDelta::MAX);
            let wake = self
                .clock
                .now()
                .checked_add_signed(delay)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = self.clock.sleep_until(wake) => {}
            }
        }

        tracing::info!(pending = self.pending.len(), "Shutting down");
        self.flush().await;
        self.notify("Shutting bot down!").await;
    }

    /// Mirror the named posts once, waiting out any processing backoff.
    ///
    /// Returns the posts that received a comment and the names the feed did not know.
    #[tracing::instrument(skip(self, full_names), fields(count = full_names.len()))]
    pub async fn mirror_posts(&mut self, full_names: &[String]) -> ExmbResult<(Vec<String>, Vec<String>)> {
        let (posts, not_found) = self.discovery.lookup(full_names).await?;
        for name in &not_found {
            tracing::warn!(post = %name, "Post not found");
        }

        for post in self.discovery.select(posts).await? {
            self.orchestrator.enqueue(post);
        }

        let resolved = self.orchestrator.run_to_completion().await;
        self.mirror_resolved(resolved).await;
        let mirrored = self.flush().await;
        Ok((mirrored, not_found))
    }

    async fn mirror_resolved(&mut self, items: Vec<WorkItem>) -> usize {
        let mut mirrored = 0;
        for item in items {
            let Some(direct_url) = item.resolved().clone() else {
                continue;
            };
            let post = item.into_post();

            let blob = match self.fetcher.fetch(&direct_url, DEFAULT_FILENAME).await {
                Ok(blob) => blob,
                Err(e) => {
                    tracing::warn!(post = %post.full_name(), error = %e.kind, "Media fetch failed, dropping post");
                    continue;
                }
            };

            let results = self.aggregator.mirror(&post, &direct_url, &blob).await;
            self.pending.push_back((post, results));
            mirrored += 1;
        }
        mirrored
    }

    async fn flush(&mut self) -> Vec<String> {
        let mut published = Vec::new();
        while let Some((post, results)) = self.pending.pop_front() {
            match self.composer.publish(&post, &results).await {
                Ok(Some(_)) => published.push(post.full_name().clone()),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(post = %post.full_name(), error = %e, "Failed to post mirror comment")
                }
            }
        }
        published
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.notify(text).await {
            tracing::warn!(error = %e, "Notification failed");
        }
    }
}

/// Poll `shutdown` once without waiting.
async fn has_fired<F>(shutdown: &mut F) -> bool
where
    F: Future<Output = ()> + Unpin,
{
    tokio::select! {
        biased;
        _ = shutdown => true,
        _ = std::future::ready(()) => false,
    }
}
