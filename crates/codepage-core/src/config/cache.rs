//! Cache configuration.

use serde::{Deserialize, Serialize};

/// In-memory cache configuration for resolved collection schemas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a resolved field map stays valid, in seconds.
    #[serde(default = "default_field_map_ttl")]
    pub field_map_ttl_seconds: u64,
    /// Maximum number of collections whose field maps are kept.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            field_map_ttl_seconds: default_field_map_ttl(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_field_map_ttl() -> u64 {
    3600
}

fn default_max_capacity() -> u64 {
    256
}
