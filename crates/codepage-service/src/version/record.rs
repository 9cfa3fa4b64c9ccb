//! Mapping between version entities and semantic field values.

use serde_json::json;

use codepage_core::result::AppResult;
use codepage_core::types::field::{FieldName, FieldValues};
use codepage_core::types::id::{CodepageId, VersionId};
use codepage_entity::version::{CodepageVersion, NewVersion};

use crate::codepage::record::{record_number, text, timestamp};

/// Field values for a new version record.
pub fn to_fields(version: &NewVersion) -> FieldValues {
    FieldValues::from([
        (FieldName::CodepageRef, json!(version.codepage_id.get())),
        (FieldName::VersionLabel, json!(version.version_label)),
        (FieldName::CodeSnapshot, json!(version.code_snapshot)),
        (FieldName::ChangeLog, json!(version.change_log)),
    ])
}

/// Rebuild a version from a fetched row.
pub fn from_fields(values: &FieldValues) -> AppResult<CodepageVersion> {
    Ok(CodepageVersion {
        id: VersionId(record_number(values, FieldName::RecordId)?),
        codepage_id: CodepageId(record_number(values, FieldName::CodepageRef)?),
        version_label: text(values, FieldName::VersionLabel),
        code_snapshot: text(values, FieldName::CodeSnapshot),
        change_log: text(values, FieldName::ChangeLog),
        created_date: timestamp(values, FieldName::CreatedDate),
    })
}
