//! In-memory record store for service tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};

use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_core::traits::store::RecordStore;
use codepage_core::types::field::{FieldName, FieldValues};
use codepage_core::types::filter::{Filter, value_text};
use codepage_core::types::id::{CollectionId, RecordId};
use codepage_core::types::query::RecordQuery;

/// Applies filters, sorting and limits locally. Record numbers are shared
/// across collections and every create gets a later creation timestamp.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<CollectionId, Vec<FieldValues>>,
    next_id: u64,
    failing_names: Vec<String>,
    missing: HashMap<CollectionId, Vec<FieldName>>,
    queries: usize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create` fail for records with this name.
    pub fn fail_creates_named(&self, name: &str) {
        self.lock().failing_names.push(name.to_string());
    }

    /// Treat `field` as a column the collection lacks: writes drop it and
    /// filters on it fail.
    pub fn without_field(&self, collection: &CollectionId, field: FieldName) {
        self.lock()
            .missing
            .entry(collection.clone())
            .or_default()
            .push(field);
    }

    /// All rows of a collection.
    pub fn rows(&self, collection: &CollectionId) -> Vec<FieldValues> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of queries served.
    pub fn query_count(&self) -> usize {
        self.lock().queries
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl State {
    fn missing(&self, collection: &CollectionId) -> &[FieldName] {
        self.missing.get(collection).map_or(&[], Vec::as_slice)
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => value_text(x).cmp(&value_text(y)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn query(
        &self,
        collection: &CollectionId,
        query: &RecordQuery,
    ) -> AppResult<Vec<FieldValues>> {
        let mut state = self.lock();
        state.queries += 1;
        if let Some(field) = query.filter.as_ref().and_then(|filter| {
            state
                .missing(collection)
                .iter()
                .find(|f| filter.references(**f))
        }) {
            return Err(AppError::configuration(format!(
                "Field '{field}' is not mapped in this collection"
            )));
        }
        let mut rows: Vec<FieldValues> = state
            .collections
            .get(collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filter.as_ref().is_none_or(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            query
                .sort
                .iter()
                .map(|s| {
                    let ord = compare(a.get(&s.field), b.get(&s.field));
                    if s.descending { ord.reverse() } else { ord }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }
        if !query.select.is_empty() {
            for row in &mut rows {
                row.retain(|field, _| query.select.contains(field));
            }
        }
        Ok(rows)
    }

    async fn create(&self, collection: &CollectionId, values: FieldValues) -> AppResult<RecordId> {
        let mut state = self.lock();
        let name = values.get(&FieldName::Name).map(value_text);
        if name.is_some_and(|n| state.failing_names.contains(&n)) {
            return Err(AppError::http(400, "{\"message\":\"Bad request\"}"));
        }

        let mut row = values;
        row.retain(|field, _| !state.missing(collection).contains(field));

        state.next_id += 1;
        let id = state.next_id;
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default()
            + Duration::seconds(id as i64);

        row.insert(FieldName::RecordId, json!(id));
        row.insert(FieldName::CreatedDate, json!(created.to_rfc3339()));
        row.insert(FieldName::ModifiedDate, json!(created.to_rfc3339()));
        state
            .collections
            .entry(collection.clone())
            .or_default()
            .push(row);
        Ok(RecordId(id))
    }

    async fn update(
        &self,
        collection: &CollectionId,
        id: RecordId,
        values: FieldValues,
    ) -> AppResult<()> {
        let mut state = self.lock();
        let mut values = values;
        values.retain(|field, _| !state.missing(collection).contains(field));
        let row = state
            .collections
            .get_mut(collection)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|r| r.get(&FieldName::RecordId) == Some(&json!(id.get())))
            })
            .ok_or_else(|| AppError::not_found(format!("No record {id}")))?;
        row.extend(values);
        Ok(())
    }

    async fn delete(&self, collection: &CollectionId, filter: &Filter) -> AppResult<u64> {
        let mut state = self.lock();
        let Some(rows) = state.collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !filter.matches(row));
        Ok((before - rows.len()) as u64)
    }

    async fn has_field(&self, collection: &CollectionId, field: FieldName) -> AppResult<bool> {
        Ok(!self.lock().missing(collection).contains(&field))
    }
}
