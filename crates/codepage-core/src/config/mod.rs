//! Application configuration schemas.
//!
//! Configuration is deserialized from TOML files via the `config` crate.
//! Each sub-module represents a logical configuration section.

pub mod auth;
pub mod cache;
pub mod collections;
pub mod logging;
pub mod retry;
pub mod store;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::auth::{AuthConfig, AuthMode};
pub use self::cache::CacheConfig;
pub use self::collections::CollectionsConfig;
pub use self::logging::LoggingConfig;
pub use self::retry::RetryConfig;
pub use self::store::StoreConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Every section has defaults so that a bare environment (credentials
/// supplied through `CODEPAGE__AUTH__USER_TOKEN` and friends) is enough.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Remote record store connection.
    #[serde(default)]
    #[validate(nested)]
    pub store: StoreConfig,
    /// Credentials and temporary-token freshness.
    #[serde(default)]
    #[validate(nested)]
    pub auth: AuthConfig,
    /// Retry ladder.
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryConfig,
    /// Remote collections.
    #[serde(default)]
    pub collections: CollectionsConfig,
    /// Schema cache.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the given file with an environment-specific overlay
    /// (`config/{env}.toml`) and environment variables prefixed with
    /// `CODEPAGE__`, then validates the result.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CODEPAGE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }
}
