//! Top-level error wrapper types.

use crate::{ConfigError, FeedError, HostError, NotifyError, StorageError};

/// Every error the bot can surface, by subsystem.
///
/// # Examples
///
/// ```
/// use exmb_error::{ExmbError, ConfigError};
///
/// let err: ExmbError = ConfigError::new("missing subreddit").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ExmbErrorKind {
    /// Video host error
    #[from(HostError)]
    Host(HostError),
    /// Content feed error
    #[from(FeedError)]
    Feed(FeedError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Notification sink error
    #[from(NotifyError)]
    Notify(NotifyError),
    /// Local state storage error
    #[from(StorageError)]
    Storage(StorageError),
}

/// exmb error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("exmb Error: {}", _0)]
pub struct ExmbError(Box<ExmbErrorKind>);

impl ExmbError {
    /// Create a new error from a kind.
    pub fn new(kind: ExmbErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ExmbErrorKind {
        &self.0
    }
}

impl<T> From<T> for ExmbError
where
    T: Into<ExmbErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for exmb operations.
pub type ExmbResult<T> = std::result::Result<T, ExmbError>;
