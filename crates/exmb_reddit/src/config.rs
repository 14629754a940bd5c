//! Reddit client settings.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "https://oauth.reddit.com".to_string()
}

fn default_user_agent() -> String {
    format!("exmb/{}", env!("CARGO_PKG_VERSION"))
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_interval_ms() -> u64 {
    2000
}

/// Reddit client configuration.
///
/// # Examples
///
/// ```
/// use exmb_reddit::RedditConfigBuilder;
///
/// let config = RedditConfigBuilder::default()
///     .user_agent("linux:exmb:v0.3.0 (by /u/ContentPuff)")
///     .build()
///     .expect("valid config");
///
/// assert_eq!(*config.requests_per_minute(), 60);
/// assert_eq!(config.base_url(), "https://oauth.reddit.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct RedditConfig {
    /// API root.
    #[builder(default = "default_base_url()")]
    #[serde(default = "default_base_url")]
    base_url: String,
    /// User agent sent with every request.
    #[builder(default = "default_user_agent()")]
    #[serde(default = "default_user_agent")]
    user_agent: String,
    /// Request quota shared by every call.
    #[builder(default = "default_requests_per_minute()")]
    #[serde(default = "default_requests_per_minute")]
    requests_per_minute: u32,
    /// Retries for idempotent reads.
    #[builder(default = "default_max_retries()")]
    #[serde(default = "default_max_retries")]
    max_retries: usize,
    /// Delay between read retries.
    #[builder(default = "default_retry_interval_ms()")]
    #[serde(default = "default_retry_interval_ms")]
    retry_interval_ms: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            requests_per_minute: default_requests_per_minute(),
            max_retries: default_max_retries(),
            retry_interval_ms: default_retry_interval_ms(),
        }
    }
}
