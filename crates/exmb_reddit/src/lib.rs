//! Reddit feed source for exmb.
//!
//! [`RedditClient`] implements [`exmb_interface::FeedSource`] against
//! `https://oauth.reddit.com` with a bearer token obtained elsewhere.
//! Requests share one governor quota; idempotent reads are retried on
//! transport errors and 5xx/429 responses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod models;

pub use client::RedditClient;
pub use config::{RedditConfig, RedditConfigBuilder};
