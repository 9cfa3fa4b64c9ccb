//! Cache key builders for every Codepage Hub cache entry.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use codepage_core::types::id::CollectionId;

/// Prefix applied to all Codepage Hub cache keys.
const PREFIX: &str = "codepage";

/// Cache key for the temporary token authorizing one resource.
pub fn token(resource_id: &str) -> String {
    format!("{PREFIX}:token:{resource_id}")
}

/// Cache key for the resolved field map of a collection.
pub fn field_map(collection: &CollectionId) -> String {
    format!("{PREFIX}:fields:{collection}")
}
