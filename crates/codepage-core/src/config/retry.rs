//! Retry and backoff configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Retry ladder applied to every logical request.
///
/// The delay before attempt `n + 1` is `backoff_unit_ms * backoff_base^n`,
/// capped at `max_delay_ms`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetryConfig {
    /// Maximum attempts per logical call, including the first.
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
    /// Exponential base of the backoff.
    #[serde(default = "default_base")]
    #[validate(range(min = 1, max = 10))]
    pub backoff_base: u32,
    /// Unit the exponential term is multiplied by, in milliseconds.
    #[serde(default = "default_unit")]
    pub backoff_unit_ms: u64,
    /// Upper bound for a single delay, in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Extra statuses retried besides every 5xx. 401 is always handled by
    /// the refresh path.
    #[serde(default = "default_statuses")]
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base: default_base(),
            backoff_unit_ms: default_unit(),
            max_delay_ms: default_max_delay(),
            retryable_statuses: default_statuses(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base() -> u32 {
    2
}

fn default_unit() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_statuses() -> Vec<u16> {
    vec![429]
}
