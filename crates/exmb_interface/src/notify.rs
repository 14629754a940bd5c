//! Operator notifications.

use async_trait::async_trait;
use exmb_error::NotifyError;

/// Best-effort channel for status messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `text`.
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

/// Notifier that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _text: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
