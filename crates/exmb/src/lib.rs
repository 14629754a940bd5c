//! exmb mirrors clip-host videos posted to a subreddit onto alternate hosts
//! and replies with the mirror links.
//!
//! The library side wires the engine crates together from a layered
//! [`ExmbConfig`] and a per-alias [`Credential`]; the `exmb` binary drives it.

#![warn(missing_docs)]

mod config;
mod credentials;
mod notify;
mod observability;
mod wiring;

pub use config::{
    BotOverrides, BotSettings, CommentSettings, ExmbConfig, StreamableSettings, TargetConfig,
    default_max_size_mb,
};
pub use credentials::{Credential, CredentialStore, DiscordCredential, RedditCredential};
#[cfg(feature = "discord")]
pub use notify::DiscordNotifier;
pub use notify::LogNotifier;
pub use observability::init_tracing;
pub use wiring::{build_bot, host_registry, notifier, reddit_client, streamable_credentials, upload_host};

// Re-export the engine surface for embedding
pub use exmb_core::*;
pub use exmb_engine::*;
pub use exmb_error::*;
pub use exmb_interface::*;

/// Link-post full name for `id`, adding the `t3_` prefix to bare ids.
///
/// ```
/// assert_eq!(exmb::post_full_name("abc123"), "t3_abc123");
/// assert_eq!(exmb::post_full_name("t3_abc123"), "t3_abc123");
/// ```
pub fn post_full_name(id: &str) -> String {
    if id.starts_with("t3_") {
        id.to_string()
    } else {
        format!("t3_{}", id)
    }
}
