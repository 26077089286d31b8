//! Pagination module
//!
//! Supports: page number + page size, total count in body or header
//!
//! # Overview
//!
//! Every provider listing is paginated by a 1-based page number and a page
//! size capped at 100. The provider reports the total number of items, which
//! tells the fetcher when to stop. Items flow into a [`RowSink`], and a
//! [`RowBudget`] caps how many rows a whole query emits.

mod types;

pub use types::{
    effective_page_size, Flow, Page, PageCursor, PaginationConfig, PaginationState, RowBudget,
    RowSink, TotalCountSource, MAX_PAGE_SIZE,
};
