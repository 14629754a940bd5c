//! Status message sinks.

use async_trait::async_trait;
use exmb_error::NotifyError;
use exmb_interface::Notifier;
use tracing::info;

/// Writes status messages to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        info!(status = text, "Bot status");
        Ok(())
    }
}

#[cfg(feature = "discord")]
pub use discord::DiscordNotifier;

#[cfg(feature = "discord")]
mod discord {
    use async_trait::async_trait;
    use exmb_error::{ConfigError, ExmbResult, NotifyError};
    use exmb_interface::Notifier;
    use serenity::http::Http;
    use serenity::model::id::UserId;
    use std::sync::Arc;
    use tracing::{debug, info, instrument};

    /// Direct-messages the bot owner on Discord.
    pub struct DiscordNotifier {
        http: Arc<Http>,
        owner: UserId,
    }

    impl std::fmt::Debug for DiscordNotifier {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DiscordNotifier")
                .field("owner", &self.owner)
                .finish_non_exhaustive()
        }
    }

    impl DiscordNotifier {
        /// Notifier for `owner_id` using the bot `token`.
        pub fn new(token: impl AsRef<str>, owner_id: u64) -> ExmbResult<Self> {
            if owner_id == 0 {
                return Err(ConfigError::new("Discord owner id must be non-zero").into());
            }
            info!(owner_id, "Creating Discord notifier");
            Ok(Self {
                http: Arc::new(Http::new(token.as_ref())),
                owner: UserId::new(owner_id),
            })
        }
    }

    #[async_trait]
    impl Notifier for DiscordNotifier {
        #[instrument(skip(self, text), fields(owner = %self.owner))]
        async fn notify(&self, text: &str) -> Result<(), NotifyError> {
            let channel = self
                .owner
                .create_dm_channel(&*self.http)
                .await
                .map_err(|e| NotifyError::new(format!("Failed to open DM channel: {}", e)))?;

            channel
                .id
                .say(&*self.http, text)
                .await
                .map_err(|e| NotifyError::new(format!("Failed to send DM: {}", e)))?;

            debug!("Sent Discord status message");
            Ok(())
        }
    }
}
