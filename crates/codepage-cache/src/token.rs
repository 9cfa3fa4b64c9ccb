//! Temporary-token cache with per-resource single-flight acquisition.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use codepage_core::result::AppResult;
use codepage_core::traits::clock::Clock;
use codepage_entity::token::TemporaryToken;

use crate::keys;

/// One slot per resource id. The slot mutex is held across acquisition so
/// concurrent callers for the same resource wait for a single issuance.
type Slot = Arc<Mutex<Option<TemporaryToken>>>;

/// Caches at most one temporary token per resource id.
///
/// A token is only ever returned for the resource id it was issued for.
#[derive(Debug)]
pub struct TokenCache {
    /// Slots keyed by [`keys::token`].
    slots: DashMap<String, Slot>,
    /// Reuse window for an issued token.
    freshness: chrono::Duration,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl TokenCache {
    /// Create an empty cache.
    pub fn new(freshness: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: DashMap::new(),
            freshness: chrono::Duration::from_std(freshness)
                .unwrap_or_else(|_| chrono::Duration::minutes(5)),
            clock,
        }
    }

    fn slot(&self, resource_id: &str) -> Slot {
        self.slots
            .entry(keys::token(resource_id))
            .or_default()
            .value()
            .clone()
    }

    /// Return a fresh cached token, or run `acquire` and cache its result.
    ///
    /// Any prior entry for the resource is replaced. A failed acquisition
    /// leaves the slot empty.
    pub async fn get_or_acquire<F, Fut>(&self, resource_id: &str, acquire: F) -> AppResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<String>>,
    {
        let slot = self.slot(resource_id);
        let mut entry = slot.lock().await;

        let now = self.clock.now();
        if let Some(cached) = entry.as_ref().filter(|t| t.is_fresh(now, self.freshness)) {
            debug!(resource_id, "Reusing cached temporary token");
            return Ok(cached.token.clone());
        }

        *entry = None;
        let token = acquire().await?;
        *entry = Some(TemporaryToken::new(token.clone(), self.clock.now()));
        debug!(resource_id, "Cached new temporary token");
        Ok(token)
    }

    /// Evict the token for a resource unconditionally.
    pub async fn invalidate(&self, resource_id: &str) {
        let slot = self.slot(resource_id);
        *slot.lock().await = None;
    }

    /// Evict the token for a resource only if it is still `rejected`.
    ///
    /// Returns `false` when another caller already replaced it.
    pub async fn invalidate_if(&self, resource_id: &str, rejected: &str) -> bool {
        let slot = self.slot(resource_id);
        let mut entry = slot.lock().await;
        if entry.as_ref().is_some_and(|t| t.token == rejected) {
            *entry = None;
            true
        } else {
            false
        }
    }

    /// The cached token for a resource, fresh or not.
    pub async fn peek(&self, resource_id: &str) -> Option<TemporaryToken> {
        let slot = self.slots.get(&keys::token(resource_id))?.value().clone();
        let entry = slot.lock().await;
        entry.clone()
    }
}
