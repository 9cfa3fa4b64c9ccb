//! Unified application error types for Codepage Hub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A temporary token could not be obtained, or was rejected after refresh.
    Authentication,
    /// The remote store answered with a non-success status.
    Http,
    /// Transport-level failure (connect, send, receive, timeout).
    Network,
    /// The requested record was not found.
    NotFound,
    /// An update was requested with no fields to change.
    NoOpUpdate,
    /// Imported text matched none of the known formats.
    UnrecognizedFormat,
    /// Caller-supplied arguments failed validation.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Http => write!(f, "HTTP"),
            Self::Network => write!(f, "NETWORK"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::NoOpUpdate => write!(f, "NO_OP_UPDATE"),
            Self::UnrecognizedFormat => write!(f, "UNRECOGNIZED_FORMAT"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Codepage Hub.
///
/// Remote failures keep the HTTP status and response body so callers can
/// tell a store rejection apart from a transient failure.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// HTTP status returned by the remote store, if any.
    pub status: Option<u16>,
    /// Raw response body returned by the remote store, if any.
    pub body: Option<String>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    /// Create an HTTP error carrying the remote status and body.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            status: Some(status),
            body: Some(body.clone()),
            ..Self::new(
                ErrorKind::Http,
                format!("Remote store returned status {status}: {}", truncate(&body)),
            )
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a no-op update error.
    pub fn no_op_update(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoOpUpdate, message)
    }

    /// Create an unrecognized-format error.
    pub fn unrecognized_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnrecognizedFormat, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Prefix the message with the logical operation that failed.
    ///
    /// The kind, status and body are left untouched.
    pub fn context(mut self, operation: &str) -> Self {
        self.message = format!("{operation}: {}", self.message);
        self
    }

    /// Whether the remote store answered 401 Unauthorized.
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Http && self.status == Some(401)
    }

    /// Whether the failure came from the remote side (HTTP or transport),
    /// as opposed to local argument, format, or configuration problems.
    pub fn is_remote(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Http | ErrorKind::Network | ErrorKind::Authentication
        )
    }

    /// A short, user-facing hint describing what the caller can do next.
    pub fn user_hint(&self) -> &'static str {
        match self.kind {
            ErrorKind::Network => "Transient failure, retries exhausted. Try again later.",
            ErrorKind::Http => match self.status {
                Some(429) | Some(500..=599) => {
                    "Remote store is unavailable or rate limiting, retries exhausted. Try again later."
                }
                _ => "Rejected by the remote store. Check the request and field values.",
            },
            ErrorKind::Authentication => {
                "Could not authorize against the remote store. Check the configured credentials."
            }
            ErrorKind::NotFound => "The requested record does not exist.",
            ErrorKind::NoOpUpdate => "Nothing to update. Supply at least one field.",
            ErrorKind::UnrecognizedFormat => {
                "Input is neither a markup document nor structured metadata."
            }
            ErrorKind::Validation => "Fix the listed input problems and retry.",
            ErrorKind::Configuration => "Check the configuration files and environment.",
            ErrorKind::Serialization | ErrorKind::Internal => "Unexpected internal failure.",
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            status: self.status,
            body: self.body.clone(),
            source: None,
        }
    }
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Invalid configuration: {err}"),
            err,
        )
    }
}
