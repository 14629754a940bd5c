//! Mirroring engine for exmb.
//!
//! One bot cycle runs the components in order:
//!
//! 1. [`DiscoveryCursor`] recovers from a deleted cursor and pulls new posts, oldest first.
//! 2. [`Orchestrator`] resolves each post's source media, re-checking hosts that are
//!    still processing within a bounded attempt budget.
//! 3. [`MirrorAggregator`] uploads the fetched media to every configured target.
//! 4. [`CommentComposer`] renders the results and replies once per post.
//!
//! [`MirrorBot`] ties them into a polling loop.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregator;
mod bot;
mod composer;
mod discovery;
mod ledger;
mod orchestrator;
mod registry;

pub use aggregator::MirrorAggregator;
pub use bot::{CycleReport, DEFAULT_INTERVAL, MirrorBot};
pub use composer::{CommentComposer, ComposerConfig, ComposerConfigBuilder, MAX_REASON_CHARS};
pub use discovery::{DiscoveryConfig, DiscoveryConfigBuilder, DiscoveryCursor};
pub use ledger::JsonCommentLedger;
pub use orchestrator::{DEFAULT_MAX_ATTEMPTS, Orchestrator, OrchestratorStats, ReadyBatch};
pub use registry::HostRegistry;
