//! Engine types
//!
//! Configuration, statistics and the row stream handed to callers.

use crate::error::Result;
use crate::pagination::MAX_PAGE_SIZE;
use crate::types::Row;
use futures::Stream;
use std::pin::Pin;

/// Stream of mapped rows merged from every partition of a query
pub type RowStream = Pin<Box<dyn Stream<Item = Result<Row>> + Send>>;

/// Configuration for a fan-out fetch
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Largest page size to request
    pub page_size_max: u32,
    /// Cap on rows emitted by the whole query
    pub row_limit: Option<u64>,
    /// Partitions fetched in parallel
    pub max_concurrency: usize,
    /// Rows buffered between the fetch tasks and the consumer
    pub channel_capacity: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size_max: MAX_PAGE_SIZE,
            row_limit: None,
            max_concurrency: 8,
            channel_capacity: 256,
        }
    }
}

impl FetchConfig {
    /// Create a new fetch config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size_max = size;
        self
    }

    /// Set row limit
    #[must_use]
    pub fn with_row_limit(mut self, limit: Option<u64>) -> Self {
        self.row_limit = limit;
        self
    }

    /// Set concurrency
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.max_concurrency = concurrency;
        self
    }

    /// Set channel capacity
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

/// Statistics from one partition's fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Page requests issued
    pub pages_fetched: usize,
    /// Items received from the provider
    pub items_seen: u64,
    /// Items handed to the sink
    pub rows_emitted: u64,
    /// The sink or the row limit ended the fetch before the listing did
    pub stopped_early: bool,
    /// The consumer went away between pages
    pub cancelled: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl FetchStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page
    pub fn add_page(&mut self, items: usize) {
        self.pages_fetched += 1;
        self.items_seen += items as u64;
    }

    /// Add an emitted row
    pub fn add_row(&mut self) {
        self.rows_emitted += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }

    /// Merge another partition's stats into these
    pub fn merge(&mut self, other: &FetchStats) {
        self.pages_fetched += other.pages_fetched;
        self.items_seen += other.items_seen;
        self.rows_emitted += other.rows_emitted;
        self.stopped_early |= other.stopped_early;
        self.cancelled |= other.cancelled;
        self.duration_ms = self.duration_ms.max(other.duration_ms);
    }
}
