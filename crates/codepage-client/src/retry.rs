//! Retry policy: attempt budget, backoff curve, and retryable predicate.

use std::time::Duration;

use codepage_core::config::RetryConfig;
use codepage_core::error::{AppError, ErrorKind};

/// Decides whether and when a failed attempt is retried.
///
/// The delay after failed attempt `n` (starting at 1) is
/// `unit * base^n`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per logical call, including the first.
    max_attempts: u32,
    /// Exponential base.
    base: u32,
    /// Multiplier for the exponential term.
    unit: Duration,
    /// Cap on a single delay.
    max_delay: Duration,
    /// Statuses outside 5xx also treated as transient.
    retryable_statuses: Vec<u16>,
}

impl RetryPolicy {
    /// Build a policy from configuration.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base: config.backoff_base,
            unit: Duration::from_millis(config.backoff_unit_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            retryable_statuses: config.retryable_statuses.clone(),
        }
    }

    /// Replace the backoff unit (e.g. to shorten delays in tests).
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Replace the attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Attempts per logical call.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after failed attempt `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.base.checked_pow(attempt).unwrap_or(u32::MAX);
        self.unit
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether an error may go away on its own.
    ///
    /// Transport failures, every 5xx, and configured extra statuses are
    /// transient. A 401 that reaches the ladder (i.e. after the one refresh)
    /// is retried like any other transient failure. Every other 4xx is fatal.
    pub fn is_retryable(&self, err: &AppError) -> bool {
        match err.kind {
            ErrorKind::Network => true,
            ErrorKind::Http => match err.status {
                Some(401) | Some(500..=599) => true,
                Some(status) => self.retryable_statuses.contains(&status),
                None => false,
            },
            _ => false,
        }
    }

    /// Whether to run another attempt after `attempt` failed with `err`.
    pub fn should_retry(&self, err: &AppError, attempt: u32) -> bool {
        attempt < self.max_attempts && self.is_retryable(err)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
