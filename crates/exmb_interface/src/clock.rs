//! Time source for backoff.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Wall clock plus the ability to wait for a point in time.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;

    /// Suspend until `deadline`. Returns at once if it already passed.
    async fn sleep_until(&self, deadline: DateTime<Utc>);
}

/// Clock backed by the system time and tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        if let Ok(remaining) = (deadline - Utc::now()).to_std() {
            tokio::time::sleep(remaining).await;
        }
    }
}
