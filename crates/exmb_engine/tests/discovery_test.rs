//! Tests for the discovery cursor and its rollback stack.

mod test_utils;

use exmb_core::CursorStack;
use exmb_engine::{DiscoveryConfig, DiscoveryConfigBuilder, DiscoveryCursor, HostRegistry};
use exmb_error::FeedErrorKind;
use std::sync::Arc;
use test_utils::{MockFeed, MockSourceHost, clip_post, comment, post};

fn config() -> DiscoveryConfig {
    DiscoveryConfigBuilder::default()
        .channel("formula1")
        .build()
        .expect("valid config")
}

fn cursor(feed: &Arc<MockFeed>, config: DiscoveryConfig) -> DiscoveryCursor {
    let registry = Arc::new(HostRegistry::new().with_source(Arc::new(MockSourceHost::new())));
    DiscoveryCursor::new(feed.clone(), registry, config)
}

fn names(posts: &[exmb_core::Post]) -> Vec<String> {
    posts.iter().map(|p| p.full_name().clone()).collect()
}

#[tokio::test]
async fn test_advance_emits_oldest_first() {
    let feed = Arc::new(MockFeed::with_posts(vec![
        clip_post("e"),
        clip_post("d"),
        clip_post("c"),
        clip_post("b"),
        clip_post("a"),
    ]));
    let mut discovery = cursor(&feed, config()).with_cursor(Some("t3_b".into()));

    let posts = discovery.advance().await.expect("advance");

    assert_eq!(names(&posts), vec!["t3_c", "t3_d", "t3_e"]);
    assert_eq!(discovery.cursor(), Some("t3_e"));
    assert_eq!(
        discovery.stack().iter().collect::<Vec<_>>(),
        vec!["t3_c", "t3_d", "t3_e"]
    );
}

#[tokio::test]
async fn test_advance_without_new_posts_keeps_cursor() {
    let feed = Arc::new(MockFeed::with_posts(vec![clip_post("a")]));
    let mut discovery = cursor(&feed, config()).with_cursor(Some("t3_a".into()));

    let posts = discovery.advance().await.expect("advance");

    assert!(posts.is_empty());
    assert_eq!(discovery.cursor(), Some("t3_a"));
}

#[tokio::test]
async fn test_advance_respects_limit() {
    let feed = Arc::new(MockFeed::with_posts(vec![
        clip_post("d"),
        clip_post("c"),
        clip_post("b"),
        clip_post("a"),
    ]));
    let config = DiscoveryConfigBuilder::default()
        .channel("formula1")
        .limit(2u32)
        .build()
        .expect("valid config");
    let mut discovery = cursor(&feed, config).with_cursor(Some("t3_a".into()));

    let posts = discovery.advance().await.expect("advance");

    assert_eq!(names(&posts), vec!["t3_b", "t3_c"]);
    assert_eq!(discovery.cursor(), Some("t3_c"));
}

#[tokio::test]
async fn test_unsupported_posts_are_filtered_but_cursor_moves() {
    let feed = Arc::new(MockFeed::with_posts(vec![
        post("d", "https://elsewhere.test/d"),
        post("c", "https://clips.test/album/c"),
        clip_post("b"),
        clip_post("a"),
    ]));
    let mut discovery = cursor(&feed, config()).with_cursor(Some("t3_a".into()));

    let posts = discovery.advance().await.expect("advance");

    assert_eq!(names(&posts), vec!["t3_b"]);
    assert_eq!(discovery.cursor(), Some("t3_d"));
    assert!(!discovery.stack().contains("t3_d"));
}

#[tokio::test]
async fn test_strict_mode_requires_pinned_moderator_comment() {
    let feed = Arc::new(MockFeed::with_posts(vec![
        clip_post("c"),
        clip_post("b"),
        clip_post("a"),
    ]));
    feed.set_comments("t3_b", vec![comment("m1", "AutoModerator", false, true)]);
    feed.set_comments("t3_c", vec![comment("m2", "AutoModerator", true, true)]);
    let config = DiscoveryConfigBuilder::default()
        .channel("formula1")
        .strict_moderator_filter(true)
        .build()
        .expect("valid config");
    let mut discovery = cursor(&feed, config).with_cursor(Some("t3_a".into()));

    let posts = discovery.advance().await.expect("advance");

    assert_eq!(names(&posts), vec!["t3_b"]);
}

#[tokio::test]
async fn test_recover_keeps_live_cursor() {
    let feed = Arc::new(MockFeed::with_posts(vec![clip_post("cur")]));
    let mut discovery = cursor(&feed, config()).with_cursor(Some("t3_cur".into()));

    let changed = discovery.recover().await.expect("recover");

    assert!(!changed);
    assert_eq!(discovery.cursor(), Some("t3_cur"));
}

#[tokio::test]
async fn test_recover_skips_deleted_stack_entries() {
    let feed = Arc::new(MockFeed::with_posts(vec![
        clip_post("cur"),
        clip_post("b"),
        clip_post("a"),
    ]));
    feed.remove("t3_cur");
    feed.remove("t3_b");
    let mut stack = CursorStack::new();
    stack.push("t3_a");
    stack.push("t3_b");
    let mut discovery = cursor(&feed, config())
        .with_cursor(Some("t3_cur".into()))
        .with_stack(stack);

    let changed = discovery.recover().await.expect("recover");

    assert!(changed);
    assert_eq!(discovery.cursor(), Some("t3_a"));
    assert_eq!(discovery.stack().peek(), Some("t3_a"));
    assert!(!discovery.stack().contains("t3_b"));
}

#[tokio::test]
async fn test_recover_treats_vanished_post_as_deleted() {
    let feed = Arc::new(MockFeed::with_posts(vec![clip_post("cur"), clip_post("a")]));
    feed.purge("t3_cur");
    let mut stack = CursorStack::new();
    stack.push("t3_a");
    let mut discovery = cursor(&feed, config())
        .with_cursor(Some("t3_cur".into()))
        .with_stack(stack);

    discovery.recover().await.expect("recover");

    assert_eq!(discovery.cursor(), Some("t3_a"));
}

#[tokio::test]
async fn test_recover_bootstraps_when_stack_empties() {
    let feed = Arc::new(MockFeed::with_posts(vec![
        clip_post("new"),
        clip_post("cur"),
        clip_post("a"),
    ]));
    feed.remove("t3_cur");
    feed.remove("t3_a");
    let mut stack = CursorStack::new();
    stack.push("t3_a");
    let mut discovery = cursor(&feed, config())
        .with_cursor(Some("t3_cur".into()))
        .with_stack(stack);

    discovery.recover().await.expect("recover");

    assert_eq!(discovery.cursor(), Some("t3_new"));
    assert!(discovery.stack().is_empty());
}

#[tokio::test]
async fn test_recover_without_cursor_bootstraps() {
    let feed = Arc::new(MockFeed::with_posts(vec![clip_post("b"), clip_post("a")]));
    let mut discovery = cursor(&feed, config());

    discovery.recover().await.expect("recover");
    assert_eq!(discovery.cursor(), Some("t3_b"));

    feed.push_newest(clip_post("c"));
    let posts = discovery.advance().await.expect("advance");
    assert_eq!(names(&posts), vec!["t3_c"]);
}

#[tokio::test]
async fn test_bootstrap_on_empty_feed_fails() {
    let feed = Arc::new(MockFeed::new());
    let mut discovery = cursor(&feed, config());

    let err = discovery.bootstrap().await.expect_err("empty feed");

    assert!(matches!(err.kind(), FeedErrorKind::EmptyFeed(channel) if channel == "formula1"));
}

#[tokio::test]
async fn test_stack_capacity_evicts_oldest() {
    let feed = Arc::new(MockFeed::with_posts(vec![
        clip_post("d"),
        clip_post("c"),
        clip_post("b"),
        clip_post("a"),
    ]));
    let config = DiscoveryConfigBuilder::default()
        .channel("formula1")
        .cursor_stack_capacity(Some(2))
        .build()
        .expect("valid config");
    let mut discovery = cursor(&feed, config).with_cursor(Some("t3_a".into()));

    discovery.advance().await.expect("advance");

    assert_eq!(
        discovery.stack().iter().collect::<Vec<_>>(),
        vec!["t3_c", "t3_d"]
    );
}

#[tokio::test]
async fn test_lookup_reports_missing_posts() {
    let feed = Arc::new(MockFeed::with_posts(vec![clip_post("a")]));
    let discovery = cursor(&feed, config());

    let (found, missing) = discovery
        .lookup(&["t3_a".to_string(), "t3_zz".to_string()])
        .await
        .expect("lookup");

    assert_eq!(names(&found), vec!["t3_a"]);
    assert_eq!(missing, vec!["t3_zz"]);
}
