//! Mapping between codepage entities and semantic field values.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_core::types::field::{FieldName, FieldValues};
use codepage_core::types::filter::{parse_bool, value_text};
use codepage_core::types::id::CodepageId;
use codepage_entity::codepage::{
    Codepage, CodepageDraft, CodepagePatch, join_dependencies, join_tags, split_dependencies,
    split_tags,
};

/// Field values for a new codepage record.
pub fn draft_to_fields(draft: &CodepageDraft) -> FieldValues {
    let mut values = FieldValues::new();
    values.insert(FieldName::Name, json!(draft.name));
    values.insert(FieldName::Code, json!(draft.code));
    if let Some(description) = &draft.description {
        values.insert(FieldName::Description, json!(description));
    }
    if let Some(version) = &draft.version {
        values.insert(FieldName::Version, json!(version));
    }
    if !draft.tags.is_empty() {
        values.insert(FieldName::Tags, json!(join_tags(&draft.tags)));
    }
    if !draft.dependencies.is_empty() {
        values.insert(
            FieldName::Dependencies,
            json!(join_dependencies(&draft.dependencies)),
        );
    }
    if let Some(target) = &draft.target_table_id {
        values.insert(FieldName::TargetTableId, json!(target));
    }
    values.insert(FieldName::Active, json!(draft.active));
    values
}

/// Field values for the fields present in a patch.
pub fn patch_to_fields(patch: &CodepagePatch) -> FieldValues {
    let mut values = FieldValues::new();
    if let Some(name) = &patch.name {
        values.insert(FieldName::Name, json!(name));
    }
    if let Some(code) = &patch.code {
        values.insert(FieldName::Code, json!(code));
    }
    if let Some(description) = &patch.description {
        values.insert(FieldName::Description, json!(description));
    }
    if let Some(version) = &patch.version {
        values.insert(FieldName::Version, json!(version));
    }
    if let Some(tags) = &patch.tags {
        values.insert(FieldName::Tags, json!(join_tags(tags)));
    }
    if let Some(deps) = &patch.dependencies {
        values.insert(FieldName::Dependencies, json!(join_dependencies(deps)));
    }
    if let Some(target) = &patch.target_table_id {
        values.insert(FieldName::TargetTableId, json!(target));
    }
    if let Some(active) = patch.active {
        values.insert(FieldName::Active, json!(active));
    }
    values
}

/// Rebuild a codepage from a fetched row.
pub fn from_fields(values: &FieldValues) -> AppResult<Codepage> {
    Ok(Codepage {
        id: CodepageId(record_number(values, FieldName::RecordId)?),
        name: text(values, FieldName::Name),
        code: text(values, FieldName::Code),
        description: optional_text(values, FieldName::Description),
        version: optional_text(values, FieldName::Version),
        tags: split_tags(&text(values, FieldName::Tags)),
        dependencies: split_dependencies(&text(values, FieldName::Dependencies)),
        target_table_id: optional_text(values, FieldName::TargetTableId),
        active: flag(values, FieldName::Active, true),
        created_date: timestamp(values, FieldName::CreatedDate),
        modified_date: timestamp(values, FieldName::ModifiedDate),
    })
}

/// Text value of a field; absent and null read as empty.
pub(crate) fn text(values: &FieldValues, field: FieldName) -> String {
    values.get(&field).map(value_text).unwrap_or_default()
}

/// Text value of a field, `None` when absent or blank.
pub(crate) fn optional_text(values: &FieldValues, field: FieldName) -> Option<String> {
    Some(text(values, field)).filter(|s| !s.trim().is_empty())
}

/// Boolean value of a field, `default` when absent, null or unreadable.
pub(crate) fn flag(values: &FieldValues, field: FieldName, default: bool) -> bool {
    match values.get(&field) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if !s.trim().is_empty() => parse_bool(s).unwrap_or(default),
        Some(Value::Number(n)) => n.as_i64().map_or(default, |n| n != 0),
        _ => default,
    }
}

/// Record number held in a field, given as a number or numeric text.
pub(crate) fn record_number(values: &FieldValues, field: FieldName) -> AppResult<u64> {
    let value = values
        .get(&field)
        .ok_or_else(|| AppError::internal(format!("Record is missing field '{field}'")))?;
    let number = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.ok_or_else(|| {
        AppError::internal(format!("Field '{field}' is not a record number: {value}"))
    })
}

/// RFC 3339 timestamp held in a field, if readable.
pub(crate) fn timestamp(values: &FieldValues, field: FieldName) -> Option<DateTime<Utc>> {
    let raw = optional_text(values, field)?;
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
