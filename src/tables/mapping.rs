//! Row mapping and qual handling
//!
//! Provider items stay JSON documents; columns pick values out of them by
//! field path and coerce them to the column type.

use super::types::{ColumnSource, QualPlan, Table, Transform};
use crate::error::{Error, Result};
use crate::partition::MatrixItem;
use crate::types::{ColumnType, JsonValue, Row};
use chrono::DateTime;
use std::collections::HashMap;
use std::net::IpAddr;

impl Table {
    /// Map a provider item to a row
    ///
    /// Every column is present in the row; values that are missing or do not
    /// fit the column type are null.
    pub fn map_row(&self, item: &JsonValue, matrix: &MatrixItem) -> Row {
        let mut row = Row::new();
        for column in &self.columns {
            let raw = match &column.source {
                ColumnSource::Field(path) => lookup(item, path).cloned(),
                ColumnSource::Partition { field, key } => lookup(item, field)
                    .filter(|v| !v.is_null())
                    .cloned()
                    .or_else(|| matrix.get(key).map(|v| JsonValue::String(v.to_string()))),
                ColumnSource::Transform { field, transform } => {
                    lookup(item, field).map(|v| apply_transform(v, *transform))
                }
            };
            row.insert(
                column.name.clone(),
                coerce(raw.unwrap_or(JsonValue::Null), column.ty),
            );
        }
        row
    }

    /// Split quals into partition pruning, API parameters and row filters
    pub fn plan_quals(&self, quals: &HashMap<String, String>) -> Result<QualPlan> {
        let mut names: Vec<&String> = quals.keys().collect();
        names.sort();

        let mut plan = QualPlan::default();
        for name in names {
            let value = quals[name].clone();
            if self.column(name).is_none() {
                return Err(Error::invalid_value(
                    name.clone(),
                    format!("no such column in table '{}'", self.name),
                ));
            }

            if self.scope.key() == Some(name.as_str()) {
                plan.partition = Some(value);
            } else if self.list.key_columns.iter().any(|c| c == name) {
                plan.api.push((name.clone(), value));
            } else {
                plan.filters.push((name.clone(), value));
            }
        }
        Ok(plan)
    }
}

/// Whether a row satisfies every equality filter
pub fn row_matches(row: &Row, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(column, expected)| {
        row.get(column)
            .and_then(scalar_string)
            .is_some_and(|actual| actual == *expected)
    })
}

/// Follow a dot-separated path (`public_ip.address`)
pub fn lookup<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.').try_fold(value, |current, part| current.get(part))
}

fn scalar_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn apply_transform(value: &JsonValue, transform: Transform) -> JsonValue {
    match transform {
        Transform::ToString => match value {
            JsonValue::Null => JsonValue::Null,
            JsonValue::Array(items) if items.iter().all(JsonValue::is_string) => JsonValue::String(
                items
                    .iter()
                    .filter_map(JsonValue::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            JsonValue::Array(_) | JsonValue::Object(_) => JsonValue::String(value.to_string()),
            other => scalar_string(other).map_or(JsonValue::Null, JsonValue::String),
        },
        Transform::Amount => {
            let units = value.get("units").and_then(number_or_string).unwrap_or(0.0);
            let nanos = value.get("nanos").and_then(number_or_string).unwrap_or(0.0);
            if value.is_object() {
                serde_json::Number::from_f64(units + nanos / 1e9)
                    .map_or(JsonValue::Null, JsonValue::Number)
            } else {
                JsonValue::Null
            }
        }
        Transform::Currency => value
            .get("currency_code")
            .cloned()
            .unwrap_or(JsonValue::Null),
    }
}

fn number_or_string(value: &JsonValue) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// Coerce a value to a column type; mismatches become null
fn coerce(value: JsonValue, ty: ColumnType) -> JsonValue {
    match (ty, value) {
        (_, JsonValue::Null) => JsonValue::Null,
        (ColumnType::Json, v) => v,
        (ColumnType::String, JsonValue::String(s)) => JsonValue::String(s),
        (ColumnType::String, v @ (JsonValue::Array(_) | JsonValue::Object(_))) => {
            JsonValue::String(v.to_string())
        }
        (ColumnType::String, v) => scalar_string(&v).map_or(JsonValue::Null, JsonValue::String),
        (ColumnType::Int, JsonValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map_or(JsonValue::Null, JsonValue::from),
        (ColumnType::Int, JsonValue::String(s)) => s
            .parse::<i64>()
            .map_or(JsonValue::Null, JsonValue::from),
        (ColumnType::Double, JsonValue::Number(n)) => {
            n.as_f64().map_or(JsonValue::Null, JsonValue::from)
        }
        (ColumnType::Double, JsonValue::String(s)) => s
            .parse::<f64>()
            .map_or(JsonValue::Null, JsonValue::from),
        (ColumnType::Bool, JsonValue::Bool(b)) => JsonValue::Bool(b),
        (ColumnType::Bool, JsonValue::String(s)) => match s.as_str() {
            "true" => JsonValue::Bool(true),
            "false" => JsonValue::Bool(false),
            _ => JsonValue::Null,
        },
        (ColumnType::Timestamp, JsonValue::String(s)) => JsonValue::String(s),
        (ColumnType::Timestamp, JsonValue::Number(n)) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map_or(JsonValue::Null, |ts| JsonValue::String(ts.to_rfc3339())),
        (ColumnType::IpAddr, JsonValue::String(s)) if s.parse::<IpAddr>().is_ok() => {
            JsonValue::String(s)
        }
        _ => JsonValue::Null,
    }
}
