//! Reddit OAuth API client.

use crate::RedditConfig;
use crate::models::{
    ApiResponse, CommentResult, LinkData, Listing, NamedThing, comments_from_thread, decode_error,
    posts_from_listing,
};
use async_trait::async_trait;
use exmb_core::{Comment, Post};
use exmb_error::{FeedError, FeedErrorKind, FeedResult};
use exmb_interface::FeedSource;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Most ids `/api/info` accepts per call.
const INFO_BATCH: usize = 100;

/// Reddit client authenticated with a bearer token.
#[derive(Clone)]
pub struct RedditClient {
    client: Client,
    access_token: String,
    config: RedditConfig,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl RedditClient {
    /// Create a client for `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    #[instrument(skip_all, fields(base_url = %config.base_url()))]
    pub fn new(access_token: impl Into<String>, config: RedditConfig) -> FeedResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .gzip(true)
            .build()
            .map_err(|e| FeedError::new(FeedErrorKind::Transport(format!("Failed to build HTTP client: {}", e))))?;

        let per_minute = NonZeroU32::new(*config.requests_per_minute()).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client,
            access_token: access_token.into(),
            config,
            limiter,
        })
    }

    /// Settings in use.
    pub fn config(&self) -> &RedditConfig {
        &self.config
    }

    /// Delay between read retries.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(*self.config.retry_interval_ms())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.config.base_url(), path))
            .bearer_auth(&self.access_token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> FeedResult<T> {
        self.limiter.until_ready().await;

        let response = request.send().await.map_err(|e| {
            FeedError::new(FeedErrorKind::Transport(format!("Request failed: {}", e)))
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(FeedError::new(FeedErrorKind::Api { status, message }));
        }

        response.json().await.map_err(decode_error)
    }

    /// GET with retries on retryable failures.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> FeedResult<T> {
        let strategy = FixedInterval::from_millis(*self.config.retry_interval_ms())
            .take(*self.config.max_retries());

        Retry::spawn(strategy, || {
            let request = self.request(Method::GET, path).query(query);
            async move {
                match self.send(request).await {
                    Ok(value) => Ok(value),
                    Err(e) if e.is_retryable() => {
                        warn!(path, error = %e.kind, "Reddit request failed, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => Err(RetryError::Permanent(e)),
                }
            }
        })
        .await
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: &[(&str, &str)]) -> FeedResult<T> {
        let request = self.request(Method::POST, path).form(form);
        self.send(request).await
    }
}

impl std::fmt::Debug for RedditClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FeedSource for RedditClient {
    #[instrument(skip(self))]
    async fn list_new(&self, channel: &str, before: Option<&str>, limit: u32) -> FeedResult<Vec<Post>> {
        let mut query = vec![("limit", limit.to_string()), ("raw_json", "1".to_string())];
        if let Some(before) = before {
            query.push(("before", before.to_string()));
        }

        let listing: Listing<LinkData> = self.get_json(&format!("/r/{}/new", channel), &query).await?;
        let posts = posts_from_listing(listing)?;
        debug!(count = posts.len(), "Listed new posts");
        Ok(posts)
    }

    #[instrument(skip(self, full_names), fields(count = full_names.len()))]
    async fn post_info(&self, full_names: &[String]) -> FeedResult<Vec<Post>> {
        let mut posts = Vec::with_capacity(full_names.len());
        for batch in full_names.chunks(INFO_BATCH) {
            let query = [("id", batch.join(",")), ("raw_json", "1".to_string())];
            let listing: Listing<LinkData> = self.get_json("/api/info", &query).await?;
            posts.extend(posts_from_listing(listing)?);
        }
        Ok(posts)
    }

    #[instrument(skip(self, post), fields(post = %post.full_name()))]
    async fn comments(&self, post: &Post, limit: u32) -> FeedResult<Vec<Comment>> {
        let query = [("limit", limit.to_string()), ("raw_json", "1".to_string())];
        let thread: Vec<serde_json::Value> = self
            .get_json(&format!("/r/{}/comments/{}", post.channel(), post.id()), &query)
            .await?;
        comments_from_thread(thread)
    }

    #[instrument(skip(self, text))]
    async fn post_comment(&self, parent_full_name: &str, text: &str) -> FeedResult<String> {
        let response: ApiResponse<CommentResult> = self
            .post_form(
                "/api/comment",
                &[("api_type", "json"), ("thing_id", parent_full_name), ("text", text)],
            )
            .await?;
        response
            .into_data()?
            .things
            .into_iter()
            .next()
            .map(|thing| thing.data.name)
            .ok_or_else(|| decode_error("comment response listed no things"))
    }

    #[instrument(skip(self))]
    async fn submit_link(&self, channel: &str, title: &str, url: &str) -> FeedResult<String> {
        let response: ApiResponse<NamedThing> = self
            .post_form(
                "/api/submit",
                &[
                    ("api_type", "json"),
                    ("kind", "link"),
                    ("sr", channel),
                    ("title", title),
                    ("url", url),
                    ("resubmit", "true"),
                ],
            )
            .await?;
        Ok(response.into_data()?.name)
    }
}
