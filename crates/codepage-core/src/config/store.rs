//! Remote record store connection configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Connection settings for the remote record store API.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Base URL of the REST API, without a trailing slash.
    #[serde(default = "default_base_url")]
    #[validate(length(min = 1))]
    pub base_url: String,
    /// Realm hostname sent with every request (e.g. `acme.quickbase.com`).
    #[serde(default)]
    pub realm_hostname: String,
    /// Timeout applied to each individual attempt, in seconds.
    #[serde(default = "default_timeout")]
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_seconds: u64,
    /// User-Agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            realm_hostname: String::new(),
            request_timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.quickbase.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("codepage-hub/{}", env!("CARGO_PKG_VERSION"))
}
