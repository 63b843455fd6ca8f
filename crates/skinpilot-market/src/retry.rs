//! Bounded retry with exponential backoff.
//!
//! Each attempt reports an explicit `AttemptOutcome`; the driver decides
//! from the outcome kind whether to wait and try again. Waits and attempts
//! both race the cancellation token, so a cancelled lookup stops before its
//! next attempt instead of burning the remaining budget.

use crate::error::{MarketError, MarketResult};
use skinpilot_core::ErrorKind;
use skinpilot_telemetry::Metrics;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Result of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T> {
    /// Finished; stop retrying.
    Done(T),
    /// Failed in a way another attempt may fix.
    Retryable(ErrorKind, String),
    /// Failed in a way no retry will fix.
    Terminal(ErrorKind, String),
}

/// Retry budget and backoff schedule.
///
/// Wait before attempt `n` (n >= 2) is `backoff_base^(n-1)` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub backoff_base: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base: 2,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before `attempt` (1-based). Zero for the first attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = (attempt - 1).min(16);
        let factor = self.backoff_base.saturating_pow(exponent);
        self.backoff_unit.saturating_mul(factor)
    }

    /// Sum of all backoff waits when every attempt fails.
    pub fn total_backoff(&self) -> Duration {
        (2..=self.max_attempts.max(1))
            .map(|attempt| self.delay_before(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Run `attempt_fn` until it finishes, fails terminally, the budget is
    /// exhausted, or `cancel` fires.
    ///
    /// `attempt_fn` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut attempt_fn: F,
    ) -> MarketResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptOutcome<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut last_failure = (ErrorKind::TransportError, String::new());

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = self.delay_before(attempt);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    cause = %last_failure.0,
                    "Backing off before retry"
                );
                Metrics::lookup_retry(last_failure.0.as_str(), delay.as_millis() as f64);

                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = cancel.cancelled() => {
                        debug!(attempt, "Cancelled during backoff");
                        return Err(MarketError::Cancelled);
                    }
                }
            }

            if cancel.is_cancelled() {
                return Err(MarketError::Cancelled);
            }

            let outcome = tokio::select! {
                outcome = attempt_fn(attempt) => outcome,
                () = cancel.cancelled() => {
                    debug!(attempt, "Cancelled during attempt");
                    return Err(MarketError::Cancelled);
                }
            };

            match outcome {
                AttemptOutcome::Done(value) => return Ok(value),
                AttemptOutcome::Terminal(kind, message) => {
                    return Err(terminal_error(kind, message, attempt));
                }
                AttemptOutcome::Retryable(kind, message) => {
                    warn!(attempt, max_attempts, cause = %kind, %message, "Attempt failed");
                    last_failure = (kind, message);
                }
            }
        }

        let (last_cause, message) = last_failure;
        Err(MarketError::UpstreamUnavailable {
            attempts: max_attempts,
            last_cause,
            message,
        })
    }
}

fn terminal_error(kind: ErrorKind, message: String, attempt: u32) -> MarketError {
    match kind {
        ErrorKind::DecodeError => MarketError::Decode(message),
        ErrorKind::Cancelled => MarketError::Cancelled,
        other => MarketError::UpstreamUnavailable {
            attempts: attempt,
            last_cause: other,
            message,
        },
    }
}
