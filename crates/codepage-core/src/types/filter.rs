//! Filter expressions for remote record queries.
//!
//! Filters are built over semantic field names and rendered into the
//! store's query language (`{fid.OP.'value'}` terms joined by `AND`/`OR`)
//! once a [`FieldMap`] is known. The same expression can be evaluated
//! locally against a record, following the store's matching rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::AppResult;
use crate::types::field::{FieldMap, FieldName, FieldValues};

/// Separator used when a tag set is stored as a single text field.
pub const TAG_DELIMITER: char = ',';

/// A filter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Exact match (`EX`). Text comparison is case-insensitive.
    Eq(FieldName, Value),
    /// Substring match (`CT`), case-insensitive.
    Contains(FieldName, String),
    /// Delimited-list membership (`HAS`), case-insensitive.
    Has(FieldName, String),
    /// All sub-filters must match.
    And(Vec<Filter>),
    /// At least one sub-filter must match.
    Or(Vec<Filter>),
}

impl Filter {
    /// Conjunction that collapses trivial cases.
    pub fn all(mut filters: Vec<Filter>) -> Option<Filter> {
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter::And(filters)),
        }
    }

    /// Whether any term of the expression tests `field`.
    pub fn references(&self, field: FieldName) -> bool {
        match self {
            Filter::Eq(f, _) | Filter::Contains(f, _) | Filter::Has(f, _) => *f == field,
            Filter::And(parts) | Filter::Or(parts) => parts.iter().any(|p| p.references(field)),
        }
    }

    /// Render to the store's query language.
    pub fn render(&self, fields: &FieldMap) -> AppResult<String> {
        match self {
            Filter::Eq(field, value) => Ok(format!(
                "{{{}.EX.{}}}",
                fields.id(*field)?,
                render_value(value)
            )),
            Filter::Contains(field, text) => Ok(format!(
                "{{{}.CT.{}}}",
                fields.id(*field)?,
                quote(text)
            )),
            Filter::Has(field, text) => Ok(format!(
                "{{{}.HAS.{}}}",
                fields.id(*field)?,
                quote(text)
            )),
            Filter::And(parts) => render_group(parts, "AND", fields),
            Filter::Or(parts) => render_group(parts, "OR", fields),
        }
    }

    /// Evaluate against a record held locally.
    pub fn matches(&self, record: &FieldValues) -> bool {
        match self {
            Filter::Eq(field, expected) => record
                .get(field)
                .is_some_and(|actual| values_equal(actual, expected)),
            Filter::Contains(field, text) => record.get(field).is_some_and(|actual| {
                value_text(actual)
                    .to_lowercase()
                    .contains(&text.to_lowercase())
            }),
            Filter::Has(field, text) => record.get(field).is_some_and(|actual| {
                split_list(&value_text(actual))
                    .iter()
                    .any(|item| item.eq_ignore_ascii_case(text.trim()))
            }),
            Filter::And(parts) => parts.iter().all(|p| p.matches(record)),
            Filter::Or(parts) => parts.iter().any(|p| p.matches(record)),
        }
    }
}

fn render_group(parts: &[Filter], op: &str, fields: &FieldMap) -> AppResult<String> {
    let rendered = parts
        .iter()
        .map(|p| {
            let text = p.render(fields)?;
            Ok(match p {
                Filter::And(_) | Filter::Or(_) => format!("({text})"),
                _ => text,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    Ok(rendered.join(op))
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Null => "''".to_string(),
        other => quote(&other.to_string()),
    }
}

/// Text view of a stored value, as the store compares it.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Split a delimited list field into trimmed, non-empty items.
pub fn split_list(text: &str) -> Vec<String> {
    text.split([TAG_DELIMITER, ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::Bool(b)) | (Value::Bool(b), Value::String(a)) => {
            parse_bool(a) == Some(*b)
        }
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => value_text(actual).eq_ignore_ascii_case(&value_text(expected)),
    }
}

/// Interpret the store's textual boolean spellings.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}
