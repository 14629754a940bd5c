//! Test utilities for exmb_engine tests.
//!
//! In-memory stand-ins for the feed, hosts, fetcher, notifier and clock.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use exmb_core::{
    Comment, CommentBuilder, HostId, MediaBlob, MediaRef, MirrorStatus, Post, PostBuilder,
    UploadMetadata,
};
use exmb_error::{
    FeedError, FeedErrorKind, FeedResult, HostError, HostErrorKind, HostResult, NotifyError,
};
use exmb_interface::{Clock, FeedSource, MediaFetcher, MirrorHost, Notifier, SourceHost};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SOURCE_PREFIX: &str = "https://clips.test/";

/// Build a post in `formula1` pointing at `url`.
pub fn post(id: &str, url: &str) -> Post {
    PostBuilder::default()
        .id(id)
        .full_name(format!("t3_{id}"))
        .title(format!("Clip {id}"))
        .source_url(url)
        .channel("formula1")
        .build()
        .expect("valid post")
}

/// Build a post whose media lives on the mock source host.
pub fn clip_post(id: &str) -> Post {
    post(id, &format!("{SOURCE_PREFIX}{id}"))
}

/// Build a first-level comment.
pub fn comment(id: &str, author: &str, locked: bool, stickied: bool) -> Comment {
    CommentBuilder::default()
        .id(id)
        .full_name(format!("t1_{id}"))
        .author(Some(author.to_string()))
        .locked(Some(locked))
        .stickied(Some(stickied))
        .build()
        .expect("valid comment")
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Feed backed by a newest-first list of posts.
#[derive(Default)]
pub struct MockFeed {
    posts: Mutex<Vec<Post>>,
    removed: Mutex<HashSet<String>>,
    comments: Mutex<HashMap<String, Vec<Comment>>>,
    posted: Mutex<Vec<(String, String)>>,
    submitted: Mutex<Vec<(String, String, String)>>,
    fail_listing: Mutex<bool>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed containing `posts`, newest first.
    pub fn with_posts(posts: Vec<Post>) -> Self {
        let feed = Self::new();
        *feed.posts.lock().unwrap() = posts;
        feed
    }

    /// Publish a new post at the top of the feed.
    pub fn push_newest(&self, post: Post) {
        self.posts.lock().unwrap().insert(0, post);
    }

    /// Mark a post removed; `post_info` still returns it.
    pub fn remove(&self, full_name: &str) {
        self.removed.lock().unwrap().insert(full_name.to_string());
    }

    /// Forget a post entirely.
    pub fn purge(&self, full_name: &str) {
        self.posts
            .lock()
            .unwrap()
            .retain(|p| p.full_name() != full_name);
    }

    pub fn set_comments(&self, post_full_name: &str, comments: Vec<Comment>) {
        self.comments
            .lock()
            .unwrap()
            .insert(post_full_name.to_string(), comments);
    }

    pub fn fail_listing(&self, fail: bool) {
        *self.fail_listing.lock().unwrap() = fail;
    }

    /// `(parent, body)` of every posted comment.
    pub fn posted(&self) -> Vec<(String, String)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<(String, String, String)> {
        self.submitted.lock().unwrap().clone()
    }

    fn snapshot(&self, post: &Post) -> Post {
        if self.removed.lock().unwrap().contains(post.full_name()) {
            PostBuilder::default()
                .id(post.id().clone())
                .full_name(post.full_name().clone())
                .title(post.title().clone())
                .source_url(post.source_url().clone())
                .channel(post.channel().clone())
                .removed_by_category(Some("moderator".to_string()))
                .build()
                .expect("valid post")
        } else {
            post.clone()
        }
    }
}

#[async_trait]
impl FeedSource for MockFeed {
    async fn list_new(
        &self,
        _channel: &str,
        before: Option<&str>,
        limit: u32,
    ) -> FeedResult<Vec<Post>> {
        if *self.fail_listing.lock().unwrap() {
            return Err(FeedError::new(FeedErrorKind::Transport(
                "connection reset".to_string(),
            )));
        }
        let posts = self.posts.lock().unwrap();
        let end = match before {
            Some(name) => match posts.iter().position(|p| p.full_name() == name) {
                Some(index) => index,
                None => return Ok(Vec::new()),
            },
            None => posts.len().min(limit as usize),
        };
        let start = end.saturating_sub(limit as usize);
        Ok(posts[start..end].iter().map(|p| self.snapshot(p)).collect())
    }

    async fn post_info(&self, full_names: &[String]) -> FeedResult<Vec<Post>> {
        let posts = self.posts.lock().unwrap();
        Ok(posts
            .iter()
            .filter(|p| full_names.contains(p.full_name()))
            .map(|p| self.snapshot(p))
            .collect())
    }

    async fn comments(&self, post: &Post, limit: u32) -> FeedResult<Vec<Comment>> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(post.full_name())
            .map(|c| c.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn post_comment(&self, parent_full_name: &str, text: &str) -> FeedResult<String> {
        let mut posted = self.posted.lock().unwrap();
        posted.push((parent_full_name.to_string(), text.to_string()));
        Ok(format!("t1_reply{}", posted.len()))
    }

    async fn submit_link(&self, channel: &str, title: &str, url: &str) -> FeedResult<String> {
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((channel.to_string(), title.to_string(), url.to_string()));
        Ok(format!("t3_sub{}", submitted.len()))
    }
}

/// Source host serving everything under [`SOURCE_PREFIX`].
pub struct MockSourceHost {
    id: HostId,
    prefixes: Vec<&'static str>,
    retry_delay: Duration,
    processing: Mutex<VecDeque<bool>>,
    always_processing: bool,
    unavailable: HashSet<String>,
    availability_error: Option<HostErrorKind>,
    resolve_error: Option<HostErrorKind>,
    processing_calls: Mutex<u32>,
}

impl MockSourceHost {
    pub fn new() -> Self {
        Self {
            id: HostId::new("clips"),
            prefixes: vec![SOURCE_PREFIX],
            retry_delay: Duration::from_secs(10),
            processing: Mutex::new(VecDeque::new()),
            always_processing: false,
            unavailable: HashSet::new(),
            availability_error: None,
            resolve_error: None,
            processing_calls: Mutex::new(0),
        }
    }

    /// Answer `is_processing` from `sequence`, then `false`.
    pub fn with_processing(self, sequence: &[bool]) -> Self {
        *self.processing.lock().unwrap() = sequence.iter().copied().collect();
        self
    }

    pub fn always_processing(mut self) -> Self {
        self.always_processing = true;
        self
    }

    pub fn with_unavailable(mut self, media: &str) -> Self {
        self.unavailable.insert(media.to_string());
        self
    }

    pub fn with_availability_error(mut self, kind: HostErrorKind) -> Self {
        self.availability_error = Some(kind);
        self
    }

    pub fn with_resolve_error(mut self, kind: HostErrorKind) -> Self {
        self.resolve_error = Some(kind);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn processing_calls(&self) -> u32 {
        *self.processing_calls.lock().unwrap()
    }
}

#[async_trait]
impl SourceHost for MockSourceHost {
    fn id(&self) -> HostId {
        self.id.clone()
    }

    fn url_prefixes(&self) -> &[&'static str] {
        &self.prefixes
    }

    fn media_ref(&self, url: &str) -> Option<MediaRef> {
        let id = url.strip_prefix(SOURCE_PREFIX)?;
        if id.is_empty() || id.starts_with("album/") {
            return None;
        }
        Some(MediaRef(id.to_string()))
    }

    fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    async fn is_available(&self, media: &MediaRef) -> HostResult<bool> {
        if let Some(kind) = &self.availability_error {
            return Err(HostError::new(kind.clone()));
        }
        Ok(!self.unavailable.contains(&media.0))
    }

    async fn is_processing(&self, _media: &MediaRef) -> HostResult<bool> {
        *self.processing_calls.lock().unwrap() += 1;
        if self.always_processing {
            return Ok(true);
        }
        Ok(self.processing.lock().unwrap().pop_front().unwrap_or(false))
    }

    async fn resolve_direct_url(&self, media: &MediaRef) -> HostResult<String> {
        if let Some(kind) = &self.resolve_error {
            return Err(HostError::new(kind.clone()));
        }
        Ok(format!("https://cdn.clips.test/{}.mp4", media.0))
    }
}

/// Mirror host recording uploads.
pub struct MockMirrorHost {
    id: HostId,
    failure: Option<HostErrorKind>,
    rejection: Option<String>,
    uploads: Mutex<Vec<u64>>,
}

impl MockMirrorHost {
    pub fn new(id: &str) -> Self {
        Self {
            id: HostId::new(id),
            failure: None,
            rejection: None,
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// Fail every upload with a transport-level error.
    pub fn with_failure(mut self, kind: HostErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }

    /// Reject every upload host-side.
    pub fn with_rejection(mut self, reason: &str) -> Self {
        self.rejection = Some(reason.to_string());
        self
    }

    /// Sizes of every upload attempted.
    pub fn uploads(&self) -> Vec<u64> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MirrorHost for MockMirrorHost {
    fn id(&self) -> HostId {
        self.id.clone()
    }

    async fn upload(
        &self,
        blob: &MediaBlob,
        _metadata: &UploadMetadata,
    ) -> HostResult<MirrorStatus> {
        self.uploads.lock().unwrap().push(blob.len());
        if let Some(kind) = &self.failure {
            return Err(HostError::new(kind.clone()));
        }
        if let Some(reason) = &self.rejection {
            return Ok(MirrorStatus::Failed(reason.clone()));
        }
        Ok(MirrorStatus::Succeeded(format!("https://{}.test/m1", self.id)))
    }
}

/// Fetcher returning zeroed blobs of a fixed size.
pub struct MockFetcher {
    size: usize,
    fail: bool,
    fetched: Mutex<Vec<String>>,
    on_fetch: Option<Arc<tokio::sync::Notify>>,
}

impl MockFetcher {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            fail: false,
            fetched: Mutex::new(Vec::new()),
            on_fetch: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            size: 0,
            fail: true,
            fetched: Mutex::new(Vec::new()),
            on_fetch: None,
        }
    }

    /// Fire `trigger` on the first download, then yield mid-download.
    pub fn with_fetch_trigger(mut self, trigger: Arc<tokio::sync::Notify>) -> Self {
        self.on_fetch = Some(trigger);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn fetch(&self, direct_url: &str, filename: &str) -> HostResult<MediaBlob> {
        let first = {
            let mut fetched = self.fetched.lock().unwrap();
            fetched.push(direct_url.to_string());
            fetched.len() == 1
        };
        if let Some(trigger) = &self.on_fetch {
            if first {
                trigger.notify_one();
            }
            tokio::task::yield_now().await;
        }
        if self.fail {
            return Err(HostError::new(HostErrorKind::Transport(
                "download interrupted".to_string(),
            )));
        }
        Ok(MediaBlob::new(vec![0u8; self.size], filename))
    }
}

/// Clock that only moves when slept on.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, by: chrono::TimeDelta) {
        *self.now.lock().unwrap() += by;
    }

    /// Deadlines passed to `sleep_until`.
    pub fn sleeps(&self) -> Vec<DateTime<Utc>> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        self.sleeps.lock().unwrap().push(deadline);
        let mut now = self.now.lock().unwrap();
        if deadline > *now {
            *now = deadline;
        }
    }
}

/// Notifier keeping every message.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: bool,
    on_sleep: Option<Arc<tokio::sync::Notify>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Signal `trigger` when the bot announces it is going to sleep.
    pub fn with_sleep_trigger(mut self, trigger: Arc<tokio::sync::Notify>) -> Self {
        self.on_sleep = Some(trigger);
        self
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        if text.starts_with("Sleeping") {
            if let Some(trigger) = &self.on_sleep {
                trigger.notify_one();
            }
        }
        if self.fail {
            return Err(NotifyError::new("webhook offline"));
        }
        Ok(())
    }
}
