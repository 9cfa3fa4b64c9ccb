//! Temporary authorization token held in memory.

use chrono::{DateTime, Duration, Utc};

/// A short-lived credential scoped to exactly one resource id.
///
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryToken {
    /// Opaque token string.
    pub token: String,
    /// When the token was issued to us.
    pub acquired_at: DateTime<Utc>,
}

impl TemporaryToken {
    /// Wrap a freshly issued token.
    pub fn new(token: impl Into<String>, acquired_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            acquired_at,
        }
    }

    /// Whether the token may still be reused at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.acquired_at < window
    }
}
