//! End-to-end tests for the bot loop against in-memory collaborators.

mod test_utils;

use chrono::TimeDelta;
use exmb_core::MirrorTarget;
use exmb_engine::{
    CommentComposer, ComposerConfig, DiscoveryConfigBuilder, DiscoveryCursor, HostRegistry,
    MirrorAggregator, MirrorBot, Orchestrator,
};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{
    ManualClock, MockFeed, MockFetcher, MockMirrorHost, MockSourceHost, RecordingNotifier,
    clip_post, start_time,
};

struct Harness {
    feed: Arc<MockFeed>,
    mirror: Arc<MockMirrorHost>,
    clock: Arc<ManualClock>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new(feed: MockFeed) -> Self {
        Self::with_notifier(feed, RecordingNotifier::new())
    }

    fn with_notifier(feed: MockFeed, notifier: RecordingNotifier) -> Self {
        Self {
            feed: Arc::new(feed),
            mirror: Arc::new(MockMirrorHost::new("streamable")),
            clock: Arc::new(ManualClock::new(start_time())),
            notifier: Arc::new(notifier),
        }
    }

    fn bot(&self, source: MockSourceHost, fetcher: MockFetcher, cursor: Option<&str>) -> MirrorBot {
        let registry = Arc::new(
            HostRegistry::new()
                .with_source(Arc::new(source))
                .with_mirror(self.mirror.clone()),
        );
        let config = DiscoveryConfigBuilder::default()
            .channel("formula1")
            .build()
            .expect("valid config");
        let discovery = DiscoveryCursor::new(self.feed.clone(), registry.clone(), config)
            .with_cursor(cursor.map(str::to_string));
        let orchestrator = Orchestrator::new(registry.clone(), self.clock.clone());
        let aggregator = MirrorAggregator::new(
            registry,
            vec![MirrorTarget::from_megabytes("streamable", 250)],
        );
        let composer = CommentComposer::new(self.feed.clone(), ComposerConfig::default());

        MirrorBot::new(
            discovery,
            orchestrator,
            aggregator,
            composer,
            Arc::new(fetcher),
            self.notifier.clone(),
            self.clock.clone(),
        )
    }
}

#[tokio::test]
async fn test_cycle_mirrors_and_comments_new_posts() {
    let harness = Harness::new(MockFeed::with_posts(vec![
        clip_post("c"),
        clip_post("b"),
        clip_post("a"),
    ]));
    let mut bot = harness.bot(MockSourceHost::new(), MockFetcher::new(1024), Some("t3_a"));

    let report = bot.run_cycle().await.expect("cycle");

    assert_eq!(*report.discovered(), 2);
    assert_eq!(*report.mirrored(), 2);
    assert_eq!(report.published(), &vec!["t3_b".to_string(), "t3_c".to_string()]);
    assert_eq!(harness.mirror.uploads(), vec![1024, 1024]);
    assert_eq!(harness.feed.posted().len(), 2);
    assert_eq!(
        harness.notifier.messages(),
        vec!["Found new posts 2 to mirror!".to_string()]
    );
    assert_eq!(bot.discovery().cursor(), Some("t3_c"));
}

#[tokio::test]
async fn test_quiet_cycle_sends_no_discovery_notice() {
    let harness = Harness::new(MockFeed::with_posts(vec![clip_post("a")]));
    let mut bot = harness.bot(MockSourceHost::new(), MockFetcher::new(1024), Some("t3_a"));

    let report = bot.run_cycle().await.expect("cycle");

    assert_eq!(*report.discovered(), 0);
    assert!(harness.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_processing_post_carries_over_to_next_cycle() {
    let harness = Harness::new(MockFeed::with_posts(vec![clip_post("b"), clip_post("a")]));
    let mut bot = harness.bot(
        MockSourceHost::new().with_processing(&[true]),
        MockFetcher::new(1024),
        Some("t3_a"),
    );

    let first = bot.run_cycle().await.expect("cycle");
    assert_eq!(*first.mirrored(), 0);
    assert_eq!(bot.orchestrator().len(), 1);

    harness.clock.advance(TimeDelta::seconds(10));
    let second = bot.run_cycle().await.expect("cycle");

    assert_eq!(*second.discovered(), 0);
    assert_eq!(second.published(), &vec!["t3_b".to_string()]);
    assert!(bot.orchestrator().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_skips_post() {
    let harness = Harness::new(MockFeed::with_posts(vec![clip_post("b"), clip_post("a")]));
    let mut bot = harness.bot(MockSourceHost::new(), MockFetcher::failing(), Some("t3_a"));

    let report = bot.run_cycle().await.expect("cycle");

    assert_eq!(*report.mirrored(), 0);
    assert!(harness.feed.posted().is_empty());
}

#[tokio::test]
async fn test_run_stops_on_shutdown_and_says_goodbye() {
    let trigger = Arc::new(tokio::sync::Notify::new());
    let harness = Harness::with_notifier(
        MockFeed::with_posts(vec![clip_post("b"), clip_post("a")]),
        RecordingNotifier::new().with_sleep_trigger(trigger.clone()),
    );
    let mut bot = harness.bot(MockSourceHost::new(), MockFetcher::new(1024), Some("t3_a"));

    bot.run(async move { trigger.notified().await }).await;

    assert_eq!(
        harness.notifier.messages(),
        vec![
            "Found new posts 1 to mirror!".to_string(),
            "Sleeping bot for 30 seconds!".to_string(),
            "Shutting bot down!".to_string(),
        ]
    );
    assert_eq!(harness.feed.posted().len(), 1);
    assert_eq!(bot.pending_comments(), 0);
}

#[tokio::test]
async fn test_shutdown_during_download_still_comments_resolved_posts() {
    let trigger = Arc::new(tokio::sync::Notify::new());
    let harness = Harness::new(MockFeed::with_posts(vec![
        clip_post("c"),
        clip_post("b"),
        clip_post("a"),
    ]));
    let fetcher = MockFetcher::new(1024).with_fetch_trigger(trigger.clone());
    let mut bot = harness.bot(MockSourceHost::new(), fetcher, Some("t3_a"));

    bot.run(async move { trigger.notified().await }).await;

    let commented: Vec<String> = harness
        .feed
        .posted()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(commented, vec!["t3_b".to_string(), "t3_c".to_string()]);
    assert_eq!(harness.mirror.uploads(), vec![1024, 1024]);
    assert_eq!(bot.pending_comments(), 0);
    assert_eq!(
        harness.notifier.messages(),
        vec![
            "Found new posts 2 to mirror!".to_string(),
            "Shutting bot down!".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_run_with_unbounded_interval_does_not_overflow() {
    let trigger = Arc::new(tokio::sync::Notify::new());
    let harness = Harness::with_notifier(
        MockFeed::with_posts(vec![clip_post("a")]),
        RecordingNotifier::new().with_sleep_trigger(trigger.clone()),
    );
    let mut bot = harness
        .bot(MockSourceHost::new(), MockFetcher::new(1024), Some("t3_a"))
        .with_interval(Duration::from_secs(u64::MAX));

    bot.run(async move { trigger.notified().await }).await;

    assert_eq!(
        harness.notifier.messages(),
        vec![
            format!("Sleeping bot for {} seconds!", u64::MAX),
            "Shutting bot down!".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_run_survives_feed_and_notifier_failures() {
    let trigger = Arc::new(tokio::sync::Notify::new());
    let harness = Harness::with_notifier(
        MockFeed::with_posts(vec![clip_post("a")]),
        RecordingNotifier::failing().with_sleep_trigger(trigger.clone()),
    );
    harness.feed.fail_listing(true);
    let mut bot = harness.bot(MockSourceHost::new(), MockFetcher::new(1024), Some("t3_a"));

    bot.run(async move { trigger.notified().await }).await;

    let messages = harness.notifier.messages();
    assert_eq!(messages.first().map(String::as_str), Some("Sleeping bot for 30 seconds!"));
    assert_eq!(messages.last().map(String::as_str), Some("Shutting bot down!"));
}

#[tokio::test]
async fn test_run_with_immediate_shutdown_does_no_work() {
    let harness = Harness::new(MockFeed::with_posts(vec![clip_post("b"), clip_post("a")]));
    let mut bot = harness.bot(MockSourceHost::new(), MockFetcher::new(1024), Some("t3_a"));

    bot.run(async {}).await;

    assert_eq!(harness.notifier.messages(), vec!["Shutting bot down!".to_string()]);
    assert!(harness.feed.posted().is_empty());
}

#[tokio::test]
async fn test_mirror_posts_waits_out_processing() {
    let harness = Harness::new(MockFeed::with_posts(vec![clip_post("b"), clip_post("a")]));
    let mut bot = harness.bot(
        MockSourceHost::new().with_processing(&[true, true]),
        MockFetcher::new(1024),
        None,
    );

    let (mirrored, not_found) = bot
        .mirror_posts(&["t3_a".to_string(), "t3_missing".to_string()])
        .await
        .expect("mirror posts");

    assert_eq!(mirrored, vec!["t3_a".to_string()]);
    assert_eq!(not_found, vec!["t3_missing".to_string()]);
    assert_eq!(harness.clock.sleeps().len(), 2);
    assert_eq!(harness.feed.posted()[0].0, "t3_a");
}
