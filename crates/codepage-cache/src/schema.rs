//! Resolved field maps per collection, cached with moka.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use codepage_core::config::CacheConfig;
use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_core::types::field::FieldMap;
use codepage_core::types::id::CollectionId;

use crate::keys;

/// Field-map cache. Concurrent lookups for the same collection share one
/// resolution.
#[derive(Debug, Clone)]
pub struct FieldMapCache {
    /// The underlying moka cache.
    cache: Cache<String, Arc<FieldMap>>,
}

impl FieldMapCache {
    /// Create a cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.field_map_ttl_seconds))
            .build();
        Self { cache }
    }

    /// Return the cached map for `collection`, resolving it on a miss.
    ///
    /// Resolution errors are returned to every waiting caller and nothing
    /// is cached.
    pub async fn get_or_resolve<F>(
        &self,
        collection: &CollectionId,
        resolve: F,
    ) -> AppResult<Arc<FieldMap>>
    where
        F: Future<Output = AppResult<FieldMap>>,
    {
        let key = keys::field_map(collection);
        self.cache
            .try_get_with(key, async {
                let map = resolve.await?;
                debug!(collection = %collection, fields = map.len(), "Resolved field map");
                Ok::<_, AppError>(Arc::new(map))
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Drop the cached map for a collection.
    pub async fn invalidate(&self, collection: &CollectionId) {
        self.cache.invalidate(&keys::field_map(collection)).await;
    }
}
