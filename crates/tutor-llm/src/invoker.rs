//! # Resilient Invoker
//!
//! The single retry/backoff wrapper around every generation call. Contract:
//!
//! 1. Attempt the call.
//! 2. On a throttling-class failure, sleep `min(cap, base * 2^(attempt-1))`
//!    and try again, up to the policy's attempt limit.
//! 3. On any other failure, surface it immediately — no retry.
//! 4. After exhausting attempts, surface [`InvokeError::GenerationExhausted`].
//!
//! Sleeps race against the cancellation token so a `stop` request never waits
//! out a backoff window. The sleep blocks only the calling session's task;
//! other sessions keep making progress.
//!
//! New external calls must be wrapped here rather than growing their own
//! retry loops.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tutor_core::retry::RetryPolicy;

use crate::generator::GeneratorError;

/// Errors surfaced by [`ResilientInvoker::invoke`].
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// All attempts were throttled.
    #[error("generation exhausted after {attempts} attempts: {source}")]
    GenerationExhausted {
        /// Total attempts made.
        attempts: u32,
        /// The final throttling error.
        #[source]
        source: GeneratorError,
    },

    /// Non-throttling failure, surfaced without retry.
    #[error(transparent)]
    Fatal(GeneratorError),

    /// Cancelled while waiting to retry or before an attempt.
    #[error("generation cancelled")]
    Cancelled,
}

/// Retry/backoff executor for generation calls.
#[derive(Clone)]
pub struct ResilientInvoker {
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl ResilientInvoker {
    /// Create an invoker with the given policy and no external cancellation.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// Create an invoker whose sleeps race against `cancel`.
    #[must_use]
    pub fn with_cancellation(policy: RetryPolicy, cancel: CancellationToken) -> Self {
        Self { policy, cancel }
    }

    /// The active retry policy.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op`, retrying throttled attempts with bounded backoff.
    ///
    /// `label` names the operation in logs and metrics.
    pub async fn invoke<T, F, Fut>(&self, label: &str, op: F) -> Result<T, InvokeError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GeneratorError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(InvokeError::Cancelled);
            }

            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(label, attempt, "generation call succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_throttling() => {
                    return Err(InvokeError::Fatal(err));
                }
                Err(err) => {
                    if attempt >= max_attempts {
                        warn!(label, attempts = attempt, "generation attempts exhausted");
                        return Err(InvokeError::GenerationExhausted {
                            attempts: attempt,
                            source: err,
                        });
                    }

                    let backoff_secs = self.policy.delay_for_attempt(attempt);
                    // Honor the service's Retry-After when it asks for longer.
                    let delay_ms = err
                        .retry_after_ms()
                        .map_or(backoff_secs * 1000, |ra| (backoff_secs * 1000).max(ra));

                    metrics::counter!("generation_retries_total", "operation" => label.to_owned())
                        .increment(1);
                    debug!(label, attempt, delay_ms, "throttled, backing off");

                    tokio::select! {
                        () = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                        () = self.cancel.cancelled() => {
                            return Err(InvokeError::Cancelled);
                        }
                    }

                    attempt += 1;
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
