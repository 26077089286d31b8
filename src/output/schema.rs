//! Arrow schema from table columns and row conversion
//!
//! Column types map to Arrow types as follows: strings, IP addresses and
//! JSON documents become `Utf8` (JSON serialised), timestamps become UTC
//! microsecond timestamps, and the numeric and boolean types map directly.

use crate::error::{Error, Result};
use crate::tables::{Column, Table};
use crate::types::{ColumnType, JsonValue, Row};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use std::collections::HashMap;
use std::sync::Arc;

/// Arrow type of a column type
pub fn arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::String | ColumnType::IpAddr | ColumnType::Json => DataType::Utf8,
        ColumnType::Int => DataType::Int64,
        ColumnType::Double => DataType::Float64,
        ColumnType::Bool => DataType::Boolean,
        ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
    }
}

/// Arrow schema of a table; every field is nullable and carries the column
/// description as metadata
pub fn table_schema(table: &Table) -> Schema {
    let fields: Vec<Field> = table
        .columns
        .iter()
        .map(|column| {
            let field = Field::new(&column.name, arrow_type(column.ty), true);
            if column.description.is_empty() {
                field
            } else {
                field.with_metadata(HashMap::from([(
                    "description".to_string(),
                    column.description.clone(),
                )]))
            }
        })
        .collect();

    Schema::new(fields).with_metadata(HashMap::from([("table".to_string(), table.name.clone())]))
}

/// Convert mapped rows to a record batch
///
/// Values that do not fit the column type are written as null.
pub fn rows_to_batch(table: &Table, rows: &[Row]) -> Result<RecordBatch> {
    let schema = Arc::new(table_schema(table));
    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let columns: Vec<ArrayRef> = table
        .columns
        .iter()
        .map(|column| build_array(column, rows))
        .collect();

    RecordBatch::try_new(schema, columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch for '{}': {e}", table.name),
    })
}

fn build_array(column: &Column, rows: &[Row]) -> ArrayRef {
    let values = rows.iter().map(|row| row.get(&column.name).filter(|v| !v.is_null()));

    match column.ty {
        ColumnType::Bool => Arc::new(
            values
                .map(|v| v.and_then(JsonValue::as_bool))
                .collect::<BooleanArray>(),
        ),

        ColumnType::Int => Arc::new(
            values
                .map(|v| v.and_then(JsonValue::as_i64))
                .collect::<Int64Array>(),
        ),

        ColumnType::Double => Arc::new(
            values
                .map(|v| v.and_then(JsonValue::as_f64))
                .collect::<Float64Array>(),
        ),

        ColumnType::Timestamp => Arc::new(
            values
                .map(|v| {
                    v.and_then(JsonValue::as_str)
                        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                        .map(|ts| ts.timestamp_micros())
                })
                .collect::<TimestampMicrosecondArray>()
                .with_timezone("UTC"),
        ),

        ColumnType::String | ColumnType::IpAddr | ColumnType::Json => Arc::new(
            values
                .map(|v| {
                    v.map(|v| match v {
                        JsonValue::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect::<StringArray>(),
        ),
    }
}
