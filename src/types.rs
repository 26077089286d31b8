//! Common types used throughout the connector
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A mapped table row: column name to value
pub type Row = JsonObject;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Scope
// ============================================================================

/// How a table's API is partitioned geographically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// A single global endpoint
    #[default]
    Global,
    /// One endpoint per region (`fr-par`)
    Region,
    /// One endpoint per zone (`fr-par-1`)
    Zone,
}

impl Scope {
    /// Name of the column and path variable carrying the partition
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Scope::Global => None,
            Scope::Region => Some("region"),
            Scope::Zone => Some("zone"),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scope::Global => "global",
            Scope::Region => "region",
            Scope::Zone => "zone",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Service
// ============================================================================

/// Provider endpoint family a table is listed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// JSON REST API authenticated with `X-Auth-Token`
    #[default]
    Api,
    /// S3-compatible object storage, one endpoint per region, signed requests
    ObjectStorage,
}

// ============================================================================
// Column Type
// ============================================================================

/// Column data type exposed to the query engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    #[default]
    String,
    Int,
    Double,
    Bool,
    Timestamp,
    IpAddr,
    Json,
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
