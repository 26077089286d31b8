//! Provider API types

use crate::error::Result;
use crate::pagination::{Page, PageCursor, PaginationConfig};
use crate::types::JsonValue;
use async_trait::async_trait;

/// Where a request is sent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    /// The connection's API endpoint
    #[default]
    Api,
    /// The object storage endpoint of a region
    ObjectStorage {
        /// Region the endpoint serves, also part of the request signature
        region: String,
    },
}

/// A rendered list call against one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Rendered endpoint path
    pub path: String,
    /// Response field holding the item array
    pub items_key: String,
    /// Pagination parameters; `None` for endpoints answering in one call
    pub pagination: Option<PaginationConfig>,
    /// Filters sent as query parameters
    pub query: Vec<(String, String)>,
    /// Endpoint serving the listing
    pub endpoint: Endpoint,
}

impl ListRequest {
    /// Create a paginated list request with default pagination
    pub fn new(path: impl Into<String>, items_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            items_key: items_key.into(),
            pagination: Some(PaginationConfig::default()),
            query: Vec::new(),
            endpoint: Endpoint::Api,
        }
    }

    /// Send the request to another endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set pagination
    #[must_use]
    pub fn with_pagination(mut self, pagination: Option<PaginationConfig>) -> Self {
        self.pagination = pagination;
        self
    }

    /// Add a query filter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// A rendered get call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    /// Rendered endpoint path
    pub path: String,
    /// Response field wrapping the resource (`server` for instance servers)
    pub unwrap_key: Option<String>,
}

impl GetRequest {
    /// Create a get request
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            unwrap_key: None,
        }
    }

    /// Set the unwrap key
    #[must_use]
    pub fn with_unwrap_key(mut self, key: Option<String>) -> Self {
        self.unwrap_key = key;
        self
    }
}

/// Remote provider API
///
/// Implementations must be immutable after construction; one handle is
/// shared by every concurrent partition fetch of a connection.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Fetch one page of a listing
    async fn list_page(&self, request: &ListRequest, cursor: PageCursor) -> Result<Page<JsonValue>>;

    /// Fetch one resource
    async fn get(&self, request: &GetRequest) -> Result<JsonValue>;
}
