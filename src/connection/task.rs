//! Per-partition list task
//!
//! One `ListTask` is shared by every matrix item of a query. For child
//! tables it first lists the parent resources of the partition and then
//! lists the children of each parent in turn.

use crate::api::{Endpoint, ListPages, ListRequest, ResourceApi};
use crate::engine::{fetch_all, ChannelSink, FetchStats};
use crate::error::{Error, Result};
use crate::pagination::{Flow, RowSink};
use crate::partition::{MatrixItem, ParentRouter, PartitionRouter};
use crate::tables::{row_matches, ParentConfig, Table};
use crate::template;
use crate::types::{JsonValue, Service};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Matrix value carrying the parent key of a child item
pub(crate) const PARENT_KEY: &str = "parent";

pub(crate) struct ListTask {
    pub table: Table,
    pub parent: Option<(Table, ParentConfig)>,
    pub api: Arc<dyn ResourceApi>,
    pub owner: Vec<(String, String)>,
    pub api_quals: Vec<(String, String)>,
    pub filters: Vec<(String, String)>,
    pub page_size: u32,
    pub row_limit: Option<u64>,
}

impl ListTask {
    /// List one matrix item into the sink
    pub async fn run(&self, item: MatrixItem, mut sink: ChannelSink) -> Result<FetchStats> {
        let result = match &self.parent {
            None => self.fetch_partition(&item, &mut sink).await,
            Some((parent_table, parent)) => {
                self.fetch_children(&item, parent_table, parent, &mut sink)
                    .await
            }
        };
        result.map_err(|e| e.upstream(self.table.name.clone(), item.id.clone()))
    }

    async fn fetch_children(
        &self,
        item: &MatrixItem,
        parent_table: &Table,
        parent: &ParentConfig,
        sink: &mut ChannelSink,
    ) -> Result<FetchStats> {
        let request = self.request(parent_table, item, &[])?;
        let mut parents: Vec<JsonValue> = Vec::new();
        fetch_all(
            &ListPages::new(self.api.as_ref(), &request),
            None,
            self.page_size,
            &mut parents,
        )
        .await?;

        let children =
            ParentRouter::new(item.clone(), parents, parent.key.clone(), PARENT_KEY).partitions()?;
        debug!(
            table = %self.table.name,
            partition = %item.id,
            parents = children.len(),
            "Listing child resources"
        );

        let mut stats = FetchStats::new();
        for child in children {
            if sink.is_closed() {
                stats.cancelled = true;
                break;
            }
            let child_stats = self.fetch_partition(&child, sink).await?;
            stats.merge(&child_stats);
        }
        Ok(stats)
    }

    async fn fetch_partition(
        &self,
        item: &MatrixItem,
        sink: &mut ChannelSink,
    ) -> Result<FetchStats> {
        let mut query = self.api_quals.clone();
        if let Some((_, ParentConfig {
            query_param: Some(param),
            ..
        })) = &self.parent
        {
            if let Some(key) = item.get(PARENT_KEY) {
                query.push((param.clone(), key.to_string()));
            }
        }
        let request = self.request(&self.table, item, &query)?;

        let mut rows = RowMapper {
            table: &self.table,
            item,
            filters: &self.filters,
            inner: sink,
        };
        fetch_all(
            &ListPages::new(self.api.as_ref(), &request),
            self.row_limit,
            self.page_size,
            &mut rows,
        )
        .await
    }

    fn request(
        &self,
        table: &Table,
        item: &MatrixItem,
        extra: &[(String, String)],
    ) -> Result<ListRequest> {
        let path = template::render(&table.list.path, &item.values)?;
        let mut request = ListRequest::new(path, table.list.items_key.clone())
            .with_pagination(table.list.pagination.clone());
        if table.list.service == Service::ObjectStorage {
            let region = item
                .get("region")
                .ok_or_else(|| Error::undefined_var("region"))?;
            request = request.with_endpoint(Endpoint::ObjectStorage {
                region: region.to_string(),
            });
        }
        if let Some(owner) = table.list.owner {
            for (name, value) in &self.owner {
                if name == owner.param() {
                    request = request.with_query(name.clone(), value.clone());
                }
            }
        }
        for (name, value) in extra {
            request = request.with_query(name.clone(), value.clone());
        }
        Ok(request)
    }
}

/// Maps provider items to rows and drops rows failing the client-side filters
struct RowMapper<'a> {
    table: &'a Table,
    item: &'a MatrixItem,
    filters: &'a [(String, String)],
    inner: &'a mut ChannelSink,
}

#[async_trait]
impl RowSink<JsonValue> for RowMapper<'_> {
    async fn emit(&mut self, value: JsonValue) -> Flow {
        let row = self.table.map_row(&value, self.item);
        if !row_matches(&row, self.filters) {
            return Flow::Continue;
        }
        self.inner.emit(row).await
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}
