//! Fixed-interval status polling

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::{RemoteStatus, UploadToken, WatermarkService};

/// Source of the pause between two polls
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real time, backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Polling schedule for one job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between attempts
    pub interval: Duration,
    /// Maximum number of status requests
    pub attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, attempts: u32) -> Self {
        Self { interval, attempts }
    }

    /// Attempts = total timeout / interval, rounded down and capped at `u32::MAX`
    pub fn from_timeout(interval: Duration, timeout: Duration) -> Self {
        let attempts = match timeout.as_nanos().checked_div(interval.as_nanos()) {
            Some(attempts) => u32::try_from(attempts).unwrap_or(u32::MAX),
            None => 0,
        };
        Self { interval, attempts }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_timeout(Duration::from_secs(3), Duration::from_secs(60))
    }
}

/// Poll until the service reports the document ready.
///
/// Returns the result URL, or [`Error::PollTimeout`] once every attempt came back not ready.
/// There is no pause after the last attempt.
pub async fn poll_until_ready(
    service: &dyn WatermarkService,
    token: &UploadToken,
    policy: &PollPolicy,
    clock: &dyn Clock,
) -> Result<String> {
    for attempt in 1..=policy.attempts {
        if let RemoteStatus::Ready { url } = service.poll_status(token).await {
            tracing::debug!("[{}] Ready after {} attempt(s)", token, attempt);
            return Ok(url);
        }

        tracing::trace!("[{}] Not ready (attempt {}/{})", token, attempt, policy.attempts);

        if attempt < policy.attempts {
            clock.sleep(policy.interval).await;
        }
    }

    Err(Error::PollTimeout)
}
