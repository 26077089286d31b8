//! Table definition types

use crate::pagination::PaginationConfig;
use crate::types::{ColumnType, Scope, Service};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Table
// ============================================================================

/// A queryable resource table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name (`scaleway_instance_server`)
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// How the underlying API is partitioned
    pub scope: Scope,

    /// List operation
    pub list: ListConfig,

    /// Get operation, if the API supports fetching one resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<GetConfig>,

    /// Columns in output order
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a table with an empty column set
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        scope: Scope,
        list: ListConfig,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            scope,
            list,
            get: None,
            columns: Vec::new(),
        }
    }

    /// Set the get operation
    #[must_use]
    pub fn with_get(mut self, get: GetConfig) -> Self {
        self.get = Some(get);
        self
    }

    /// Append columns
    #[must_use]
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in output order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether rows are listed per parent resource
    pub fn is_child(&self) -> bool {
        self.list.parent.is_some()
    }
}

// ============================================================================
// List / Get
// ============================================================================

/// How to list a table's resources in one partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    /// Path template (`/instance/v1/zones/{zone}/servers`)
    pub path: String,

    /// Response field holding the item array
    pub items_key: String,

    /// Page parameters; `None` for endpoints answering in a single call
    #[serde(default)]
    pub pagination: Option<PaginationConfig>,

    /// Columns whose equality quals are sent to the API as query parameters
    #[serde(default)]
    pub key_columns: Vec<String>,

    /// Parent table for child resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentConfig>,

    /// Owner scoping sent with every list request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerFilter>,

    /// Endpoint family serving the listing
    #[serde(default)]
    pub service: Service,
}

impl ListConfig {
    /// Paginated list with `page`/`page_size` and a body total
    pub fn new(path: impl Into<String>, items_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            items_key: items_key.into(),
            pagination: Some(PaginationConfig::default()),
            key_columns: Vec::new(),
            parent: None,
            owner: None,
            service: Service::Api,
        }
    }

    /// Single unpaginated call to the region's object storage endpoint
    pub fn object_storage(path: impl Into<String>, items_key: impl Into<String>) -> Self {
        Self {
            service: Service::ObjectStorage,
            ..Self::new(path, items_key).unpaginated()
        }
    }

    /// Use `per_page` with an `x-total-count` header
    #[must_use]
    pub fn per_page(mut self) -> Self {
        self.pagination = Some(PaginationConfig::per_page());
        self
    }

    /// Single unpaginated call
    #[must_use]
    pub fn unpaginated(mut self) -> Self {
        self.pagination = None;
        self
    }

    /// Columns forwarded to the API
    #[must_use]
    pub fn with_key_columns(mut self, columns: &[&str]) -> Self {
        self.key_columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// List once per resource of `table`
    #[must_use]
    pub fn with_parent(mut self, parent: ParentConfig) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Scope the listing to the configured organization or project
    #[must_use]
    pub fn with_owner(mut self, owner: OwnerFilter) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Parent resource a child table is listed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentConfig {
    /// Parent table name
    pub table: String,

    /// Field of the parent row identifying it (usually `id`)
    pub key: String,

    /// Query parameter carrying the parent key; when unset the key is
    /// substituted into the path as `{parent}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_param: Option<String>,
}

impl ParentConfig {
    /// Parent key substituted into the path
    pub fn in_path(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
            query_param: None,
        }
    }

    /// Parent key sent as a query parameter
    pub fn in_query(
        table: impl Into<String>,
        key: impl Into<String>,
        param: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
            query_param: Some(param.into()),
        }
    }
}

/// Owner filter applied to list requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerFilter {
    /// `organization_id`
    Organization,
    /// `project_id`
    Project,
}

impl OwnerFilter {
    /// Query parameter name
    pub fn param(&self) -> &'static str {
        match self {
            OwnerFilter::Organization => "organization_id",
            OwnerFilter::Project => "project_id",
        }
    }
}

/// How to fetch a single resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetConfig {
    /// Path template; placeholders are key columns or the partition
    pub path: String,

    /// Response field wrapping the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unwrap_key: Option<String>,

    /// Quals that must be present
    pub key_columns: Vec<String>,
}

impl GetConfig {
    /// Get by the given key columns
    pub fn new(path: impl Into<String>, key_columns: &[&str]) -> Self {
        Self {
            path: path.into(),
            unwrap_key: None,
            key_columns: key_columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Unwrap the resource from a response field
    #[must_use]
    pub fn unwrap(mut self, key: impl Into<String>) -> Self {
        self.unwrap_key = Some(key.into());
        self
    }
}

// ============================================================================
// Columns
// ============================================================================

/// A typed output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Output type
    #[serde(rename = "type")]
    pub ty: ColumnType,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Where the value comes from
    pub source: ColumnSource,
}

impl Column {
    /// Column read from the item field of the same name
    pub fn new(name: impl Into<String>, ty: ColumnType, description: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: ColumnSource::Field(name.clone()),
            name,
            ty,
            description: description.into(),
        }
    }

    /// Read from a different field path (`public_ip.address`)
    #[must_use]
    pub fn from_field(mut self, path: impl Into<String>) -> Self {
        self.source = ColumnSource::Field(path.into());
        self
    }

    /// Read from the item, falling back to a matrix value
    #[must_use]
    pub fn from_partition(mut self, key: impl Into<String>) -> Self {
        self.source = ColumnSource::Partition {
            field: self.name.clone(),
            key: key.into(),
        };
        self
    }

    /// Read a field and convert it
    #[must_use]
    pub fn transformed(mut self, path: impl Into<String>, transform: Transform) -> Self {
        self.source = ColumnSource::Transform {
            field: path.into(),
            transform,
        };
        self
    }
}

/// Source of a column value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    /// Dot-separated field path in the item
    Field(String),
    /// Item field, or the matrix value `key` when the item lacks it
    Partition { field: String, key: String },
    /// Item field passed through a conversion
    Transform { field: String, transform: Transform },
}

/// Value conversions applied to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Render scalars as strings and join string arrays with `,`
    ToString,
    /// Money object (`units`, `nanos`) to a decimal amount
    Amount,
    /// Currency code of a money object
    Currency,
}

// ============================================================================
// Query Context
// ============================================================================

/// Equality quals and row limit of a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    /// Column name to required value
    pub quals: HashMap<String, String>,
    /// Maximum rows to return
    pub limit: Option<u64>,
}

impl QueryContext {
    /// Empty context: no quals, no limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality qual
    #[must_use]
    pub fn with_qual(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.quals.insert(column.into(), value.into());
        self
    }

    /// Set the row limit
    #[must_use]
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }
}

/// Quals of a query split by where they are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualPlan {
    /// Partition value pinned by a `zone`/`region` qual
    pub partition: Option<String>,
    /// Sent to the API as query parameters
    pub api: Vec<(String, String)>,
    /// Applied to mapped rows
    pub filters: Vec<(String, String)>,
}
