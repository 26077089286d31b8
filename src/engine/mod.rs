//! Execution engine module
//!
//! Paginated fetch loop, single-item get and matrix fan-out.
//!
//! # Overview
//!
//! The engine module provides:
//! - `fetch_all` - Sequential page loop for one partition
//! - `get_one` - Single call where "not found" becomes `None`
//! - `fan_out` - Runs one fetch per matrix item and merges the rows
//!   into a single [`RowStream`]

mod types;

pub use types::{FetchConfig, FetchStats, RowStream};

use crate::error::{ErrorClass, Result};
use crate::pagination::{
    effective_page_size, Flow, Page, PageCursor, PaginationState, RowBudget, RowSink,
};
use crate::partition::MatrixItem;
use crate::types::Row;
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use std::task::Poll;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Something that can return a page of items for a cursor
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch one page
    async fn fetch_page(&self, cursor: PageCursor) -> Result<Page<T>>;
}

/// Fetch every page of a listing into a sink
///
/// Pages are requested in order starting at 1 with a page size of
/// `min(page_size_max, row_limit)`. Fetching stops when the provider total
/// has been seen, on an empty page, when the sink returns [`Flow::Stop`] or
/// once `row_limit` items were emitted. The sink is checked for closure
/// between pages only. An upstream error aborts the fetch; items from
/// earlier pages have already been emitted.
pub async fn fetch_all<T, S, K>(
    source: &S,
    row_limit: Option<u64>,
    page_size_max: u32,
    sink: &mut K,
) -> Result<FetchStats>
where
    T: Send + 'static,
    S: PageSource<T> + ?Sized,
    K: RowSink<T> + ?Sized,
{
    let start = Instant::now();
    let mut stats = FetchStats::new();

    if row_limit == Some(0) {
        return Ok(stats);
    }

    let page_size = effective_page_size(page_size_max, row_limit);
    let mut cursor = PageCursor::first(page_size);
    let mut state = PaginationState::new();

    loop {
        if sink.is_closed() {
            debug!(page = cursor.page, "Consumer closed, stopping before next page");
            stats.cancelled = true;
            break;
        }

        let page = source.fetch_page(cursor).await?;
        let count = page.len();
        let total = page.total_count;
        stats.add_page(count);
        debug!(
            page = cursor.page,
            page_size,
            items = count,
            total = ?total,
            "Fetched page"
        );

        for item in page.items {
            let flow = sink.emit(item).await;
            stats.add_row();
            if flow.should_stop() || row_limit.is_some_and(|limit| stats.rows_emitted >= limit) {
                stats.stopped_early = true;
                stats.set_duration(start.elapsed().as_millis() as u64);
                return Ok(stats);
            }
        }

        if state.record_page(count, total, page_size) == Flow::Stop {
            break;
        }
        cursor = cursor.next();
    }

    stats.set_duration(start.elapsed().as_millis() as u64);
    Ok(stats)
}

/// Run a single get call, turning "not found" into `None`
pub async fn get_one<T, Fut>(fetch: Fut) -> Result<Option<T>>
where
    Fut: Future<Output = Result<T>>,
{
    match fetch.await {
        Ok(item) => Ok(Some(item)),
        Err(e) if e.classify() == ErrorClass::NotFound => {
            debug!(error = %e, "Resource not found");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Sink feeding the merged row stream of a fan-out
///
/// Every emitted row takes one unit from the shared budget. The sink stops
/// once the budget is spent or the stream has been dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Result<Row>>,
    budget: RowBudget,
}

impl ChannelSink {
    /// Create a sink sending into `tx`
    pub fn new(tx: mpsc::Sender<Result<Row>>, budget: RowBudget) -> Self {
        Self { tx, budget }
    }

    /// The shared budget
    pub fn budget(&self) -> &RowBudget {
        &self.budget
    }
}

#[async_trait]
impl RowSink<Row> for ChannelSink {
    async fn emit(&mut self, item: Row) -> Flow {
        if !self.budget.try_take() {
            return Flow::Stop;
        }
        if self.tx.send(Ok(item)).await.is_err() {
            return Flow::Stop;
        }
        if self.budget.is_exhausted() {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed() || self.budget.is_exhausted()
    }
}

/// Run `fetch` once per matrix item and merge the rows into one stream
///
/// At most `config.max_concurrency` items run at a time; each item's fetch
/// is sequential. `config.row_limit` caps the rows of the whole stream and
/// is shared by every item. The first error is yielded and ends the stream. Dropping
/// the stream makes every sink report closed, so running fetches stop
/// before their next page.
pub fn fan_out<F, Fut>(
    items: Vec<MatrixItem>,
    config: &FetchConfig,
    fetch: F,
) -> RowStream
where
    F: Fn(MatrixItem, ChannelSink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<FetchStats>> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Result<Row>>(config.channel_capacity.max(1));
    let concurrency = config.max_concurrency.max(1);
    let budget = RowBudget::from_limit(config.row_limit);

    tokio::spawn(async move {
        let fetch = &fetch;
        let tx = &tx;
        let budget = &budget;
        let partitions = items.len();
        let started = Instant::now();

        stream::iter(items)
            .for_each_concurrent(concurrency, |item| async move {
                if tx.is_closed() || budget.is_exhausted() {
                    return;
                }
                let id = item.id.clone();
                let sink = ChannelSink::new(tx.clone(), budget.clone());
                match fetch(item, sink).await {
                    Ok(stats) => info!(
                        partition = %id,
                        pages = stats.pages_fetched,
                        rows = stats.rows_emitted,
                        "Partition complete"
                    ),
                    Err(e) => {
                        error!(partition = %id, error = %e, "Partition failed");
                        let _ = tx.send(Err(e)).await;
                    }
                }
            })
            .await;

        debug!(
            partitions,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fan-out finished"
        );
    });

    let mut failed = false;
    Box::pin(stream::poll_fn(move |cx| {
        if failed {
            return Poll::Ready(None);
        }
        match rx.poll_recv(cx) {
            Poll::Ready(Some(Err(e))) => {
                failed = true;
                rx.close();
                Poll::Ready(Some(Err(e)))
            }
            other => other,
        }
    }))
}

/// Drain a row stream into memory, stopping at the first error
pub async fn collect_rows(stream: RowStream) -> Result<Vec<Row>> {
    stream.try_collect().await
}
