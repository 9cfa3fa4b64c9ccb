//! Record-store verbs over the request client, addressed by semantic field.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use codepage_cache::FieldMapCache;
use codepage_core::config::{CacheConfig, CollectionsConfig};
use codepage_core::error::{AppError, ErrorKind};
use codepage_core::result::AppResult;
use codepage_core::traits::store::RecordStore;
use codepage_core::types::field::{FieldMap, FieldName, FieldSchema, FieldValues};
use codepage_core::types::filter::Filter;
use codepage_core::types::id::{CollectionId, RecordId};
use codepage_core::types::query::RecordQuery;

use crate::client::RequestClient;
use crate::wire::{
    self, DeleteRequest, DeleteResponse, QueryOptions, QueryRequest, QueryResponse, SortField,
    UpsertRequest, UpsertResponse,
};

/// Which semantic fields a collection carries and how to find them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Fields to resolve when present.
    pub wanted: Vec<FieldName>,
    /// Fields whose absence makes the collection unusable.
    pub required: Vec<FieldName>,
    /// Explicit semantic-name to field-id pins.
    pub overrides: HashMap<String, u32>,
}

impl CollectionSpec {
    /// The codepages collection.
    pub fn codepages(overrides: HashMap<String, u32>) -> Self {
        Self {
            wanted: FieldName::CODEPAGE_FIELDS.to_vec(),
            required: FieldName::CODEPAGE_REQUIRED.to_vec(),
            overrides,
        }
    }

    /// The codepage versions collection.
    pub fn versions(overrides: HashMap<String, u32>) -> Self {
        Self {
            wanted: FieldName::VERSION_FIELDS.to_vec(),
            required: FieldName::VERSION_REQUIRED.to_vec(),
            overrides,
        }
    }

    fn fallback() -> Self {
        Self {
            wanted: FieldName::CODEPAGE_FIELDS
                .iter()
                .chain(FieldName::VERSION_FIELDS)
                .copied()
                .collect(),
            required: vec![FieldName::RecordId],
            overrides: HashMap::new(),
        }
    }
}

/// [`RecordStore`] backed by the remote REST API.
///
/// Every call is scoped to the collection id, which is also the resource
/// id temporary tokens are issued for.
#[derive(Debug)]
pub struct RemoteRecordStore {
    client: Arc<RequestClient>,
    field_maps: FieldMapCache,
    specs: HashMap<CollectionId, CollectionSpec>,
}

impl RemoteRecordStore {
    /// Create a store with no registered collections.
    pub fn new(client: Arc<RequestClient>, cache: &CacheConfig) -> Self {
        Self {
            client,
            field_maps: FieldMapCache::new(cache),
            specs: HashMap::new(),
        }
    }

    /// Create a store with both configured collections registered.
    pub fn from_config(
        client: Arc<RequestClient>,
        cache: &CacheConfig,
        collections: &CollectionsConfig,
    ) -> Self {
        Self::new(client, cache)
            .register(
                collections.codepages.clone(),
                CollectionSpec::codepages(collections.codepage_fields.clone()),
            )
            .register(
                collections.versions.clone(),
                CollectionSpec::versions(collections.version_fields.clone()),
            )
    }

    /// Register how a collection's fields are resolved.
    pub fn register(mut self, collection: CollectionId, spec: CollectionSpec) -> Self {
        self.specs.insert(collection, spec);
        self
    }

    /// The request client.
    pub fn client(&self) -> &Arc<RequestClient> {
        &self.client
    }

    /// Resolved field map for a collection, fetched once and cached.
    pub async fn field_map(&self, collection: &CollectionId) -> AppResult<Arc<FieldMap>> {
        if collection.is_empty() {
            return Err(AppError::configuration("Collection id is not configured"));
        }
        let spec = self
            .specs
            .get(collection)
            .cloned()
            .unwrap_or_else(CollectionSpec::fallback);

        self.field_maps
            .get_or_resolve(collection, async {
                let path = format!("/fields?tableId={collection}");
                let body = self.client.get(&path, collection.as_str()).await?;
                let schema: Vec<FieldSchema> = serde_json::from_value(body)?;
                FieldMap::resolve(&schema, &spec.wanted, &spec.required, &spec.overrides)
            })
            .await
    }

    /// Forget a collection's field map so the next call re-reads the schema.
    pub async fn refresh_schema(&self, collection: &CollectionId) {
        self.field_maps.invalidate(collection).await;
    }

    fn encode(map: &FieldMap, values: FieldValues) -> Map<String, Value> {
        let mut record = Map::new();
        for (name, value) in values {
            match map.id(name) {
                Ok(id) => {
                    record.insert(id.to_string(), wire::cell(value));
                }
                Err(_) if value.is_null() => {}
                Err(_) => warn!(field = %name, "Field is not mapped in this collection, dropping value"),
            }
        }
        record
    }

    async fn upsert(
        &self,
        collection: &CollectionId,
        record: Map<String, Value>,
        record_id_field: u32,
    ) -> AppResult<wire::UpsertMetadata> {
        let request = UpsertRequest {
            to: collection.as_str(),
            data: vec![record],
            fields_to_return: vec![record_id_field],
        };
        let body = self
            .client
            .post("/records", serde_json::to_value(&request)?, collection.as_str())
            .await?;
        let response: UpsertResponse = parse(body)?;
        Ok(response.metadata)
    }
}

fn parse<T: serde::de::DeserializeOwned + Default>(body: Value) -> AppResult<T> {
    if body.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(body)?)
}

fn rejected(message: String) -> AppError {
    AppError {
        body: Some(message.clone()),
        ..AppError::new(ErrorKind::Http, format!("Remote store rejected the record: {message}"))
    }
}

#[async_trait]
impl RecordStore for RemoteRecordStore {
    async fn query(
        &self,
        collection: &CollectionId,
        query: &RecordQuery,
    ) -> AppResult<Vec<FieldValues>> {
        let map = self.field_map(collection).await?;

        let where_clause = query
            .filter
            .as_ref()
            .map(|f| f.render(&map))
            .transpose()?;
        let sort_by = query
            .sort
            .iter()
            .filter_map(|s| {
                map.id(s.field).ok().map(|field_id| SortField {
                    field_id,
                    order: if s.descending { "DESC" } else { "ASC" },
                })
            })
            .collect();
        let request = QueryRequest {
            from: collection.as_str(),
            select: map.ids_of(&query.select),
            where_clause,
            sort_by,
            options: query.limit.map(|top| QueryOptions { top }),
        };

        let body = self
            .client
            .post(
                "/records/query",
                serde_json::to_value(&request)?,
                collection.as_str(),
            )
            .await?;
        let response: QueryResponse = parse(body)?;

        let rows = response
            .data
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .filter_map(|(fid, cell)| {
                        let name = fid.parse::<u32>().ok().and_then(|id| map.name_of(id))?;
                        Some((name, cell.value))
                    })
                    .collect::<FieldValues>()
            })
            .collect::<Vec<_>>();
        debug!(collection = %collection, rows = rows.len(), "Query returned");
        Ok(rows)
    }

    async fn create(&self, collection: &CollectionId, values: FieldValues) -> AppResult<RecordId> {
        let map = self.field_map(collection).await?;
        let record_id_field = map.id(FieldName::RecordId)?;
        let mut record = Self::encode(&map, values);
        record.remove(&record_id_field.to_string());

        let metadata = self.upsert(collection, record, record_id_field).await?;
        if let Some(errors) = metadata.error_summary() {
            return Err(rejected(errors));
        }
        metadata
            .created_record_ids
            .first()
            .copied()
            .map(RecordId)
            .ok_or_else(|| AppError::internal("Remote store did not report a created record id"))
    }

    async fn update(
        &self,
        collection: &CollectionId,
        id: RecordId,
        values: FieldValues,
    ) -> AppResult<()> {
        let map = self.field_map(collection).await?;
        let record_id_field = map.id(FieldName::RecordId)?;
        let mut record = Self::encode(&map, values);
        record.insert(record_id_field.to_string(), wire::cell(json!(id.get())));

        let metadata = self.upsert(collection, record, record_id_field).await?;
        if let Some(errors) = metadata.error_summary() {
            return Err(rejected(errors));
        }
        if metadata.created_record_ids.contains(&id.get()) {
            warn!(collection = %collection, record_id = %id, "Update created a new record");
        }
        Ok(())
    }

    async fn has_field(&self, collection: &CollectionId, field: FieldName) -> AppResult<bool> {
        Ok(self.field_map(collection).await?.contains(field))
    }

    async fn delete(&self, collection: &CollectionId, filter: &Filter) -> AppResult<u64> {
        let map = self.field_map(collection).await?;
        let request = DeleteRequest {
            from: collection.as_str(),
            where_clause: filter.render(&map)?,
        };
        let body = self
            .client
            .delete(
                "/records",
                Some(serde_json::to_value(&request)?),
                collection.as_str(),
            )
            .await?;
        let response: DeleteResponse = parse(body)?;
        Ok(response.number_of_records_deleted)
    }
}
