// src/engine/retry.rs

//! Exponential-backoff retry around a single fallible operation.
//!
//! The policy itself is stateless; each call to [`retry`] starts its own
//! attempt counter, so failures on one file never eat into the attempts of
//! the next.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::errors::{ModuleError, Result};
use crate::module::{LogMessage, ModuleLog};

/// Default number of attempts (first try included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Backoff base; attempt `n` waits `base * 2^n`.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Wait before the retry that follows failed attempt `attempt` (1-based):
    /// 2s, 4s, 8s, ... with the default base.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ModuleError::Validation(
                "retry policy must allow at least one attempt".to_string(),
            ));
        }
        Ok(())
    }
}

/// Run `op`, retrying transient failures according to `policy`.
///
/// Non-transient errors (validation, overwrite conflicts, cancellation)
/// return immediately. If `cancel` fires during a backoff wait the call
/// returns `ModuleError::Cancelled` instead of trying again.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    log: &ModuleLog,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let wait = policy.backoff(attempt);
                log.warn(LogMessage::failure(&err));
                log.warn(format!(
                    "{attempt} Retrying in {} seconds",
                    wait.as_secs_f64()
                ));

                tokio::select! {
                    _ = cancel.cancelled() => return Err(ModuleError::Cancelled),
                    _ = tokio::time::sleep(wait) => {}
                }
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
