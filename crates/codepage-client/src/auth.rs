//! Ambient credential strategy used when issuing temporary tokens.

use std::fmt;

use codepage_core::config::{AuthConfig, AuthMode};
use codepage_core::error::AppError;
use codepage_core::result::AppResult;

/// How the client proves who it is to the token issuance endpoint.
///
/// Selected once at construction, never probed at call time.
#[derive(Clone, PartialEq, Eq)]
pub enum Authenticator {
    /// Long-lived pre-shared user token.
    AppToken {
        /// The user token.
        user_token: String,
        /// Application token, if the app requires one.
        app_token: Option<String>,
    },
    /// Session ticket obtained by signing in.
    SessionToken {
        /// The session ticket.
        ticket: String,
        /// Application token, if the app requires one.
        app_token: Option<String>,
    },
}

impl Authenticator {
    /// Build the strategy named by `config.mode`.
    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.trim().is_empty()).map(String::from);
        match config.mode {
            AuthMode::AppToken => {
                let user_token = present(&config.user_token).ok_or_else(|| {
                    AppError::configuration("auth.user_token is required in app_token mode")
                })?;
                Ok(Self::AppToken {
                    user_token,
                    app_token: present(&config.app_token),
                })
            }
            AuthMode::SessionToken => {
                let ticket = present(&config.session_ticket).ok_or_else(|| {
                    AppError::configuration("auth.session_ticket is required in session_token mode")
                })?;
                Ok(Self::SessionToken {
                    ticket,
                    app_token: present(&config.app_token),
                })
            }
        }
    }

    /// The configured mode.
    pub fn mode(&self) -> AuthMode {
        match self {
            Self::AppToken { .. } => AuthMode::AppToken,
            Self::SessionToken { .. } => AuthMode::SessionToken,
        }
    }

    /// Headers carrying the ambient credential.
    pub fn credential_headers(&self) -> Vec<(String, String)> {
        let (authorization, app_token) = match self {
            Self::AppToken {
                user_token,
                app_token,
            } => (format!("QB-USER-TOKEN {user_token}"), app_token),
            Self::SessionToken { ticket, app_token } => (format!("QB-TICKET {ticket}"), app_token),
        };
        let mut headers = vec![("Authorization".to_string(), authorization)];
        if let Some(app_token) = app_token {
            headers.push(("QB-App-Token".to_string(), app_token.clone()));
        }
        headers
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AppToken { app_token, .. } => f
                .debug_struct("AppToken")
                .field("user_token", &"<redacted>")
                .field("app_token", &app_token.as_ref().map(|_| "<redacted>"))
                .finish(),
            Self::SessionToken { app_token, .. } => f
                .debug_struct("SessionToken")
                .field("ticket", &"<redacted>")
                .field("app_token", &app_token.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}
