//! Pagination types and traits
//!
//! Defines the page cursor, the page returned by the provider, the shared
//! row budget and the sink items are emitted into.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Largest page the provider accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Effective page size: `min(page_size_max, row_limit)` when a limit is set
pub fn effective_page_size(page_size_max: u32, row_limit: Option<u64>) -> u32 {
    let max = page_size_max.max(1);
    match row_limit {
        Some(limit) if limit < u64::from(max) => u32::try_from(limit).unwrap_or(max).max(1),
        _ => max,
    }
}

/// Position in a paginated listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// 1-based page number
    pub page: u32,
    /// Items requested per page
    pub page_size: u32,
}

impl PageCursor {
    /// Cursor for the first page
    pub fn first(page_size: u32) -> Self {
        Self { page: 1, page_size }
    }

    /// Cursor for the following page
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in provider order
    pub items: Vec<T>,
    /// Total number of items across all pages, when the provider reports it
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(items: Vec<T>, total_count: Option<u64>) -> Self {
        Self { items, total_count }
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Where the provider reports the total item count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalCountSource {
    /// A numeric field of the response body
    Body(String),
    /// A response header
    Header(String),
    /// Not reported; pagination ends on a short page
    None,
}

impl Default for TotalCountSource {
    fn default() -> Self {
        Self::Body("total_count".to_string())
    }
}

/// Request parameters a paginated endpoint expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Query parameter carrying the page number
    pub page_param: String,
    /// Query parameter carrying the page size (`page_size` or `per_page`)
    pub page_size_param: String,
    /// Where the total item count comes from
    pub total: TotalCountSource,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_param: "page".to_string(),
            page_size_param: "page_size".to_string(),
            total: TotalCountSource::default(),
        }
    }
}

impl PaginationConfig {
    /// Pagination with `per_page` and an `x-total-count` header
    pub fn per_page() -> Self {
        Self {
            page_size_param: "per_page".to_string(),
            total: TotalCountSource::Header("x-total-count".to_string()),
            ..Self::default()
        }
    }

    /// Query parameters for a cursor
    pub fn params(&self, cursor: PageCursor) -> Vec<(String, String)> {
        vec![
            (self.page_param.clone(), cursor.page.to_string()),
            (self.page_size_param.clone(), cursor.page_size.to_string()),
        ]
    }
}

/// Whether the producer should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep emitting
    Continue,
    /// Stop now; not an error
    Stop,
}

impl Flow {
    /// Check if we should stop
    pub fn should_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Consumer of fetched items
#[async_trait]
pub trait RowSink<T: Send + 'static>: Send {
    /// Receive one item
    async fn emit(&mut self, item: T) -> Flow;

    /// Whether the consumer has gone away; checked between pages
    fn is_closed(&self) -> bool {
        false
    }
}

#[async_trait]
impl<T: Send + 'static> RowSink<T> for Vec<T> {
    async fn emit(&mut self, item: T) -> Flow {
        self.push(item);
        Flow::Continue
    }
}

/// Cap on emitted rows, shared by every partition of a query
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct RowBudget {
    remaining: Option<Arc<AtomicU64>>,
}

impl RowBudget {
    /// A budget with no cap
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// A budget allowing `limit` rows
    pub fn new(limit: u64) -> Self {
        Self {
            remaining: Some(Arc::new(AtomicU64::new(limit))),
        }
    }

    /// Budget from an optional limit
    pub fn from_limit(limit: Option<u64>) -> Self {
        limit.map_or_else(Self::unlimited, Self::new)
    }

    /// Take one row from the budget; false once exhausted
    pub fn try_take(&self) -> bool {
        let Some(remaining) = &self.remaining else {
            return true;
        };
        remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Rows still allowed (`None` when unlimited)
    pub fn remaining(&self) -> Option<u64> {
        self.remaining.as_ref().map(|r| r.load(Ordering::Acquire))
    }

    /// Check if no more rows may be emitted
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == Some(0)
    }
}

/// Tracks pagination state during a fetch
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Current page number
    pub page: u32,
    /// Items received from the provider so far
    pub seen: u64,
    /// Provider-reported total, from the latest page
    pub total: Option<u64>,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fully consumed page and decide whether another is needed
    ///
    /// Stops when the provider total has been reached, when the page was
    /// empty, or (without a total) when the page was short.
    pub fn record_page(&mut self, count: usize, total: Option<u64>, page_size: u32) -> Flow {
        self.page += 1;
        self.seen += count as u64;
        if total.is_some() {
            self.total = total;
        }

        let exhausted = match self.total {
            Some(total) => self.seen >= total,
            None => count < page_size as usize,
        };

        if count == 0 || exhausted {
            self.done = true;
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}
