//! Error types for the exmb mirroring bot.
//!
//! Every error follows the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum names the specific condition
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` so the location is captured automatically
//!
//! # Examples
//!
//! ```
//! use exmb_error::{ExmbResult, HostError, HostErrorKind};
//!
//! fn resolve() -> ExmbResult<String> {
//!     Err(HostError::new(HostErrorKind::NotFound("abc123".to_string())))?
//! }
//!
//! match resolve() {
//!     Ok(url) => println!("Got: {}", url),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod feed;
mod host;
mod notify;
mod storage;

pub use config::ConfigError;
pub use error::{ExmbError, ExmbErrorKind, ExmbResult};
pub use feed::{FeedError, FeedErrorKind, FeedResult};
pub use host::{HostError, HostErrorKind, HostResult};
pub use notify::NotifyError;
pub use storage::{StorageError, StorageErrorKind};
