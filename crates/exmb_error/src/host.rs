//! Video host errors.

/// Conditions a video host adapter can report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HostErrorKind {
    /// Media vanished before it could be processed.
    #[display("Media not found: {}", _0)]
    NotFound(String),

    /// Host is still processing the media; retry later.
    #[display("Media still processing: {}", _0)]
    StillProcessing(String),

    /// Host reports the media as permanently gone.
    #[display("Media permanently unavailable: {}", _0)]
    PermanentlyUnavailable(String),

    /// Network or authentication failure talking to the host.
    #[display("Transport failure: {}", _0)]
    Transport(String),

    /// Host answered, but not in a state that allows the requested operation.
    #[display("Upstream error: {}", _0)]
    Upstream(String),

    /// Host answered with a status or body the adapter does not understand.
    #[display("Unexpected response ({}): {}", status, message)]
    UnexpectedResponse {
        /// HTTP status code
        status: u16,
        /// Response body or description
        message: String,
    },
}

impl HostErrorKind {
    /// Whether a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StillProcessing(_) | Self::Transport(_))
    }
}

/// Host error with location tracking.
///
/// # Examples
///
/// ```
/// use exmb_error::{HostError, HostErrorKind};
///
/// let err = HostError::new(HostErrorKind::Transport("connection reset".to_string()));
/// assert!(err.is_retryable());
/// assert!(format!("{}", err).contains("connection reset"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Host Error: {} at line {} in {}", kind, line, file)]
pub struct HostError {
    /// The kind of error that occurred
    pub kind: HostErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl HostError {
    /// Create a new host error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: HostErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HostErrorKind {
        &self.kind
    }

    /// Whether a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Result type for host adapter operations.
pub type HostResult<T> = Result<T, HostError>;
