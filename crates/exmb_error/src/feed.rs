//! Content feed errors.

/// Conditions the feed source can report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FeedErrorKind {
    /// Network failure talking to the feed.
    #[display("Transport failure: {}", _0)]
    Transport(String),

    /// Feed API rejected the request.
    #[display("API error ({}): {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Channel has no posts to bootstrap a cursor from.
    #[display("No posts in {}", _0)]
    EmptyFeed(String),

    /// Response body could not be decoded.
    #[display("Decode error: {}", _0)]
    Decode(String),
}

impl FeedErrorKind {
    /// Whether the request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::EmptyFeed(_) | Self::Decode(_) => false,
        }
    }
}

/// Feed error with location tracking.
///
/// # Examples
///
/// ```
/// use exmb_error::{FeedError, FeedErrorKind};
///
/// let err = FeedError::new(FeedErrorKind::EmptyFeed("r/formula1".to_string()));
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Feed Error: {} at line {} in {}", kind, line, file)]
pub struct FeedError {
    /// The kind of error that occurred
    pub kind: FeedErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl FeedError {
    /// Create a new feed error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: FeedErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FeedErrorKind {
        &self.kind
    }

    /// Whether the request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
