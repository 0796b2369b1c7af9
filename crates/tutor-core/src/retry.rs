//! Retry policy and backoff calculation.
//!
//! Provides the portable, sync-only building blocks for the resilient
//! invoker. The actual async retry execution lives in `tutor-llm` (which has
//! access to tokio); this module contains:
//!
//! - [`RetryPolicy`]: retry parameters (max attempts, base delay, cap)
//! - [`backoff_delay_secs`]: bounded exponential backoff
//!
//! The policy here is the only retry policy in the system. Course synthesis,
//! question generation, and rubric evaluation all go through it.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Policy
// ─────────────────────────────────────────────────────────────────────────────

/// Default maximum attempts (first call + retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default base delay in seconds.
pub const DEFAULT_BASE_DELAY_SECS: u64 = 10;
/// Default maximum delay between attempts in seconds.
pub const DEFAULT_MAX_DELAY_SECS: u64 = 60;

/// Retry parameters for throttled generation calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first call (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff in seconds (default: 10).
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,
    /// Maximum delay between attempts in seconds (default: 60).
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_base_delay_secs() -> u64 {
    DEFAULT_BASE_DELAY_SECS
}
fn default_max_delay_secs() -> u64 {
    DEFAULT_MAX_DELAY_SECS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_secs: DEFAULT_BASE_DELAY_SECS,
            max_delay_secs: DEFAULT_MAX_DELAY_SECS,
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following the given failed attempt (1-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        backoff_delay_secs(attempt, self.base_delay_secs, self.max_delay_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backoff calculation
// ─────────────────────────────────────────────────────────────────────────────

/// Calculate bounded exponential backoff.
///
/// Formula: `min(max_delay, base_delay * 2^(attempt - 1))`
///
/// # Arguments
///
/// * `attempt` — 1-based index of the attempt that just failed
/// * `base_delay_secs` — base delay in seconds
/// * `max_delay_secs` — delay cap
#[must_use]
pub fn backoff_delay_secs(attempt: u32, base_delay_secs: u64, max_delay_secs: u64) -> u64 {
    let exponent = attempt.saturating_sub(1).min(31);
    let exponential = base_delay_secs.saturating_mul(1u64 << exponent);
    exponential.min(max_delay_secs)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // -- RetryPolicy --

    #[test]
    fn policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay_secs, 10);
        assert_eq!(policy.max_delay_secs, 60);
    }

    #[test]
    fn policy_serde_roundtrip() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay_secs: 5,
            max_delay_secs: 30,
        };
        let json = serde_json::to_string(&policy).unwrap();
        let back: RetryPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_attempts, 3);
        assert_eq!(back.base_delay_secs, 5);
        assert_eq!(back.max_delay_secs, 30);
    }

    #[test]
    fn policy_serde_defaults() {
        let policy: RetryPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay_secs, 10);
    }

    // -- backoff_delay_secs --

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay_secs(1, 10, 60), 10);
        assert_eq!(backoff_delay_secs(2, 10, 60), 20);
        assert_eq!(backoff_delay_secs(3, 10, 60), 40);
    }

    #[test]
    fn backoff_caps_at_max() {
        assert_eq!(backoff_delay_secs(4, 10, 60), 60);
        assert_eq!(backoff_delay_secs(5, 10, 60), 60);
    }

    #[test]
    fn backoff_zero_attempt_treated_as_first() {
        // attempt 0 should not underflow the exponent
        assert_eq!(backoff_delay_secs(0, 10, 60), 10);
    }

    #[test]
    fn backoff_high_attempt_no_overflow() {
        let delay = backoff_delay_secs(100, 10, 60);
        assert_eq!(delay, 60);
    }

    #[test]
    fn policy_delay_sequence_matches_contract() {
        // The documented sequence for the default policy: 10, 20, 40, 60.
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..5).map(|a| policy.delay_for_attempt(a)).collect();
        assert_eq!(delays, vec![10, 20, 40, 60]);
    }
}
