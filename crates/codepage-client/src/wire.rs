//! JSON shapes exchanged with the remote store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(rename = "temporaryAuthorization")]
    pub temporary_authorization: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest<'a> {
    pub from: &'a str,
    pub select: Vec<u32>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort_by: Vec<SortField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<QueryOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SortField {
    pub field_id: u32,
    pub order: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryOptions {
    pub top: u32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub data: Vec<HashMap<String, Cell>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Cell {
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpsertRequest<'a> {
    pub to: &'a str,
    pub data: Vec<Map<String, Value>>,
    pub fields_to_return: Vec<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpsertResponse {
    #[serde(default)]
    pub metadata: UpsertMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpsertMetadata {
    #[serde(default)]
    pub created_record_ids: Vec<u64>,
    #[serde(default)]
    pub updated_record_ids: Vec<u64>,
    #[serde(default)]
    pub unchanged_record_ids: Vec<u64>,
    #[serde(default)]
    pub line_errors: HashMap<String, Vec<String>>,
}

impl UpsertMetadata {
    /// All line errors flattened into one message.
    pub fn error_summary(&self) -> Option<String> {
        if self.line_errors.is_empty() {
            return None;
        }
        let mut lines: Vec<_> = self
            .line_errors
            .iter()
            .map(|(line, errors)| format!("line {line}: {}", errors.join("; ")))
            .collect();
        lines.sort();
        Some(lines.join(", "))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteRequest<'a> {
    pub from: &'a str,
    #[serde(rename = "where")]
    pub where_clause: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteResponse {
    #[serde(default)]
    pub number_of_records_deleted: u64,
}

/// Wrap a value the way the store expects cell values on write.
pub(crate) fn cell(value: Value) -> Value {
    let mut wrapped = Map::new();
    wrapped.insert("value".to_string(), value);
    Value::Object(wrapped)
}
