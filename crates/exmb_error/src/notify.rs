//! Notification sink errors.

/// Failure delivering a notification.
///
/// Callers log these and carry on; a notification failure never aborts a cycle.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Notify Error: {} at line {} in {}", message, line, file)]
pub struct NotifyError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl NotifyError {
    /// Create a new NotifyError at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
