//! Partition types and traits
//!
//! Defines the core partition abstractions.

use crate::error::Result;
use crate::types::Scope;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolved, deduplicated, ordered list of partitions. Immutable once built.
pub type PartitionList = Arc<[String]>;

/// One unit of fan-out: a partition plus the values it injects into requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixItem {
    /// Unique identifier for this item (used in logs and error context)
    pub id: String,
    /// Values available to path templates (`zone`, `region`, `parent`, ...)
    pub values: HashMap<String, String>,
}

impl MatrixItem {
    /// Create a new matrix item
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: HashMap::new(),
        }
    }

    /// Item for a global table
    pub fn global() -> Self {
        Self::new("global")
    }

    /// Item for a regional or zonal partition
    pub fn for_scope(scope: Scope, partition: &str) -> Self {
        match scope.key() {
            Some(key) => Self::new(partition).with_value(key, partition),
            None => Self::global(),
        }
    }

    /// Add a value to the item
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The partition identifier for a scope, if this item carries one
    pub fn partition(&self, scope: Scope) -> Option<&str> {
        scope.key().and_then(|key| self.get(key))
    }
}

/// Input to a partition resolution
#[derive(Debug, Clone, Copy)]
pub struct PartitionSource<'a> {
    /// Region or zone
    pub scope: Scope,
    /// Configured glob patterns (empty means "use the default")
    pub patterns: &'a [String],
    /// Canonical catalog for the scope, in catalog order
    pub catalog: &'a [String],
    /// Default partition when no patterns are configured
    pub default: &'a str,
}

/// Trait for partition routers
pub trait PartitionRouter: Send + Sync {
    /// Generate matrix items
    fn partitions(&self) -> Result<Vec<MatrixItem>>;

    /// Get the value key this router sets on its items
    fn partition_field(&self) -> &str;
}
