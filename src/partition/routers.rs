//! Partition router implementations
//!
//! Each router turns one source of fan-out into matrix items.

use super::types::{MatrixItem, PartitionList, PartitionRouter};
use crate::error::Result;
use crate::types::{JsonValue, Scope};
use std::collections::HashSet;

// ============================================================================
// Matrix Router
// ============================================================================

/// Creates one item per resolved region or zone
#[derive(Debug, Clone)]
pub struct MatrixRouter {
    scope: Scope,
    partitions: PartitionList,
}

impl MatrixRouter {
    /// Create a router over a resolved partition list
    pub fn new(scope: Scope, partitions: PartitionList) -> Self {
        Self { scope, partitions }
    }

    /// Router for global tables: a single item
    pub fn global() -> Self {
        Self {
            scope: Scope::Global,
            partitions: Vec::new().into(),
        }
    }
}

impl PartitionRouter for MatrixRouter {
    fn partitions(&self) -> Result<Vec<MatrixItem>> {
        if self.scope == Scope::Global {
            return Ok(vec![MatrixItem::global()]);
        }
        Ok(self
            .partitions
            .iter()
            .map(|p| MatrixItem::for_scope(self.scope, p))
            .collect())
    }

    fn partition_field(&self) -> &str {
        self.scope.key().unwrap_or("global")
    }
}

// ============================================================================
// Parent Router
// ============================================================================

/// Creates one item per distinct parent resource
///
/// Child resources (databases of an instance, pools of a cluster) are listed
/// per parent. Items inherit the values of the matrix item the parents were
/// listed in.
#[derive(Debug, Clone)]
pub struct ParentRouter {
    base: MatrixItem,
    parent_records: Vec<JsonValue>,
    parent_key: String,
    partition_field: String,
}

impl ParentRouter {
    /// Create a new parent router
    pub fn new(
        base: MatrixItem,
        parent_records: Vec<JsonValue>,
        parent_key: impl Into<String>,
        partition_field: impl Into<String>,
    ) -> Self {
        Self {
            base,
            parent_records,
            parent_key: parent_key.into(),
            partition_field: partition_field.into(),
        }
    }

    /// Extract the key from a parent record (dot paths allowed)
    fn extract_key(&self, record: &JsonValue) -> Option<String> {
        let mut current = record;
        for part in self.parent_key.split('.') {
            current = current.get(part)?;
        }

        match current {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl PartitionRouter for ParentRouter {
    fn partitions(&self) -> Result<Vec<MatrixItem>> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();

        for record in &self.parent_records {
            if let Some(key) = self.extract_key(record) {
                if seen.insert(key.clone()) {
                    let mut item = self.base.clone();
                    item.id = format!("{}/{key}", self.base.id);
                    items.push(item.with_value(self.partition_field.clone(), key));
                }
            }
        }

        Ok(items)
    }

    fn partition_field(&self) -> &str {
        &self.partition_field
    }
}
