//! Core data types for the exmb mirroring bot.
//!
//! These are the values that flow through one discovery, mirror and comment cycle:
//! feed snapshots ([`Post`], [`Comment`]), per-post orchestration state ([`WorkItem`]),
//! per-target results ([`MirrorOutcome`], [`MirrorResultSet`]) and the cursor
//! rollback stack ([`CursorStack`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cursor;
mod media;
mod mirror;
mod post;
mod work;

pub use cursor::CursorStack;
pub use media::{DEFAULT_FILENAME, HostId, MediaBlob, MediaRef, UploadMetadata, UploadMetadataBuilder};
pub use mirror::{MirrorOutcome, MirrorResultSet, MirrorStatus, MirrorTarget};
pub use post::{Comment, CommentBuilder, Post, PostBuilder};
pub use work::WorkItem;

/// One mebibyte, the unit size ceilings are configured in.
pub const MB: u64 = 1024 * 1024;
