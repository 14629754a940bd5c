//! Video host adapters for exmb.
//!
//! | Host | Source | Mirror |
//! |---|---|---|
//! | [`StreamableHost`] | yes | yes, imports by URL |
//! | [`StreamjaHost`] | yes | yes, two-step upload |
//! | [`StreamffHost`] | yes | yes, two-step upload |
//! | [`ImgurHost`] | yes | no |
//!
//! [`HttpMediaFetcher`] downloads resolved media for the mirror hosts.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod fetcher;
mod http;
mod imgur;
mod streamable;
mod streamff;
mod streamja;

pub use fetcher::HttpMediaFetcher;
pub use http::build_client;
pub use imgur::ImgurHost;
pub use streamable::{StreamableCredentials, StreamableHost};
pub use streamff::StreamffHost;
pub use streamja::StreamjaHost;

/// Id of the Streamable adapter.
pub const STREAMABLE: &str = "streamable";
/// Id of the Streamja adapter.
pub const STREAMJA: &str = "streamja";
/// Id of the Streamff adapter.
pub const STREAMFF: &str = "streamff";
/// Id of the Imgur adapter.
pub const IMGUR: &str = "imgur";

/// Upload ceiling for Streamable, in MB.
pub const STREAMABLE_MAX_SIZE_MB: u64 = 250;
/// Upload ceiling for Streamja, in MB.
pub const STREAMJA_MAX_SIZE_MB: u64 = 30;
/// Upload ceiling for Streamff, in MB.
pub const STREAMFF_MAX_SIZE_MB: u64 = 200;
