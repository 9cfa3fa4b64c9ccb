//! Record store trait: the narrow verb surface the core relies on.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::field::{FieldName, FieldValues};
use crate::types::filter::Filter;
use crate::types::id::{CollectionId, RecordId};
use crate::types::query::RecordQuery;

/// Query/create/update verbs against a remote multi-tenant record store.
///
/// The store is eventually consistent with per-record atomic writes and
/// no transactions across records.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the rows matching a query.
    async fn query(
        &self,
        collection: &CollectionId,
        query: &RecordQuery,
    ) -> AppResult<Vec<FieldValues>>;

    /// Create one record and return its store-assigned id.
    async fn create(&self, collection: &CollectionId, values: FieldValues) -> AppResult<RecordId>;

    /// Overwrite the given fields of an existing record.
    async fn update(
        &self,
        collection: &CollectionId,
        id: RecordId,
        values: FieldValues,
    ) -> AppResult<()>;

    /// Delete the records matching a filter; returns how many were removed.
    async fn delete(&self, collection: &CollectionId, filter: &Filter) -> AppResult<u64>;

    /// Whether the collection carries a column for `field`.
    async fn has_field(&self, _collection: &CollectionId, _field: FieldName) -> AppResult<bool> {
        Ok(true)
    }
}
