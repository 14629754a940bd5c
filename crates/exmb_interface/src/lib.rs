//! Capability traits for the exmb engine.
//!
//! The engine only talks to the outside world through these traits:
//! a [`FeedSource`] for discovery and replies, [`SourceHost`] and [`MirrorHost`]
//! for video hosts, a [`MediaFetcher`] for downloads, a [`Notifier`] for operator
//! messages, a [`Clock`] for backoff, and an optional [`CommentLedger`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod feed;
mod host;
mod ledger;
mod notify;

pub use clock::{Clock, SystemClock};
pub use feed::FeedSource;
pub use host::{DEFAULT_RETRY_DELAY, MediaFetcher, MirrorHost, SourceHost};
pub use ledger::CommentLedger;
pub use notify::{NoOpNotifier, Notifier};
