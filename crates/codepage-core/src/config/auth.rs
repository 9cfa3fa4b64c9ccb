//! Authentication configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Which ambient credential is presented when issuing temporary tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Long-lived pre-shared user token.
    AppToken,
    /// Browser or API session ticket.
    SessionToken,
}

/// Credential and temporary-token settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// Credential strategy, selected once at startup.
    #[serde(default = "default_mode")]
    pub mode: AuthMode,
    /// Pre-shared user token (used in `app_token` mode).
    #[serde(default)]
    pub user_token: Option<String>,
    /// Application token sent alongside the credential, when the app requires one.
    #[serde(default)]
    pub app_token: Option<String>,
    /// Session ticket (used in `session_token` mode).
    #[serde(default)]
    pub session_ticket: Option<String>,
    /// How long an issued temporary token is reused, in seconds.
    #[serde(default = "default_freshness")]
    #[validate(range(min = 1, max = 3600))]
    pub token_freshness_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            user_token: None,
            app_token: None,
            session_ticket: None,
            token_freshness_seconds: default_freshness(),
        }
    }
}

fn default_mode() -> AuthMode {
    AuthMode::AppToken
}

fn default_freshness() -> u64 {
    300
}
