//! Poll-until-terminal for long-running operations
//!
//! A [`PollSource`] reports the current status of one operation. The
//! [`Poller`] asks it repeatedly, sleeping according to an injectable
//! [`Backoff`] (or the server's Retry-After hint), until the operation is
//! terminal, the deadline passes, or the caller cancels.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};

/// Status reported by one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    InProgress { retry_after: Option<Duration> },
    Succeeded,
    Failed(String),
    Canceled,
}

impl PollStatus {
    /// Map an Azure status string (`Succeeded`, `Failed`, `Canceled`, ...)
    pub fn from_azure_status(status: &str, message: Option<String>) -> Self {
        if status.eq_ignore_ascii_case("succeeded") {
            PollStatus::Succeeded
        } else if status.eq_ignore_ascii_case("failed") {
            PollStatus::Failed(message.unwrap_or_else(|| "operation failed".to_string()))
        } else if status.eq_ignore_ascii_case("canceled")
            || status.eq_ignore_ascii_case("cancelled")
        {
            PollStatus::Canceled
        } else {
            PollStatus::InProgress { retry_after: None }
        }
    }
}

/// Something that can report the status of one long-running operation
#[async_trait]
pub trait PollSource: Send + Sync {
    async fn poll(&self) -> ClientResult<PollStatus>;
}

/// Delay schedule between polls
pub trait Backoff: Send + Sync {
    /// Delay after the given (1-based) unsuccessful poll
    fn delay(&self, attempt: u32) -> Duration;
}

/// Same delay every time
#[derive(Debug, Clone, Copy)]
pub struct FixedBackoff(pub Duration);

impl Backoff for FixedBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

/// Delay grows by `multiplier` each attempt, capped at `max`
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: u32,
}

impl Backoff for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let factor = self.multiplier.max(1).saturating_pow(exponent);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

/// Waits for a [`PollSource`] to reach a terminal status
#[derive(Clone)]
pub struct Poller {
    backoff: Arc<dyn Backoff>,
    timeout: Option<Duration>,
}

impl Poller {
    pub fn new(backoff: Arc<dyn Backoff>) -> Self {
        Self {
            backoff,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Poll until terminal
    ///
    /// Returns `Ok(())` on success, [`ClientError::OperationFailed`] when
    /// the operation failed or was canceled server-side,
    /// [`ClientError::Cancelled`] as soon as `cancel` fires and
    /// [`ClientError::TimedOut`] once the deadline passes.
    pub async fn wait<S>(&self, source: &S, cancel: &CancellationToken) -> ClientResult<()>
    where
        S: PollSource + ?Sized,
    {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ClientError::Cancelled);
            }

            attempt += 1;
            let status = tokio::select! {
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                status = source.poll() => status?,
            };
            let retry_after = match status {
                PollStatus::Succeeded => {
                    log::debug!("long-running operation succeeded after {} poll(s)", attempt);
                    return Ok(());
                }
                PollStatus::Failed(message) => {
                    return Err(ClientError::OperationFailed {
                        status: "Failed".to_string(),
                        message,
                    });
                }
                PollStatus::Canceled => {
                    return Err(ClientError::OperationFailed {
                        status: "Canceled".to_string(),
                        message: "operation was canceled".to_string(),
                    });
                }
                PollStatus::InProgress { retry_after } => retry_after,
            };

            let mut delay = retry_after.unwrap_or_else(|| self.backoff.delay(attempt));
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Err(ClientError::TimedOut(self.timeout.unwrap_or_default()));
                }
                delay = delay.min(deadline - now);
            }

            log::debug!("operation still in progress, polling again in {:?}", delay);
            tokio::select! {
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

impl Default for Poller {
    fn default() -> Self {
        crate::config::PollConfig::default().poller()
    }
}
