//! Connection facade
//!
//! A [`Connection`] owns everything that is computed once per configured
//! account: credentials, the resolved region and zone matrices, and the API
//! client. Queries go through [`Connection::list`] and [`Connection::get`].
//!
//! Configuration problems (bad patterns, unknown tables, missing key
//! columns) fail synchronously. Upstream failures arrive through the row
//! stream, tagged with the table and partition they came from.

mod task;

use task::ListTask;

use crate::api::{GetRequest, ResourceApi, ScalewayApi};
use crate::auth::Authenticator;
use crate::cache::{CacheEntry, CacheKey, ConnectionCache};
use crate::catalog::Catalog;
use crate::config::{ConnectionConfig, EnvProfile};
use crate::engine::{fan_out, get_one, FetchConfig, RowStream};
use crate::error::{Error, Result};
use crate::partition::{MatrixItem, MatrixRouter, PartitionList, PartitionResolver, PartitionRouter};
use crate::tables::{OwnerFilter, QueryContext, Table, TableRegistry, BUILTIN_TABLES};
use crate::template;
use crate::types::{Row, Scope, StringMap};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// One configured provider account
pub struct Connection {
    id: String,
    config: ConnectionConfig,
    env: EnvProfile,
    auth: Authenticator,
    cache: Arc<ConnectionCache>,
    resolver: PartitionResolver,
    tables: Arc<TableRegistry>,
    api: Option<Arc<dyn ResourceApi>>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("api_url", &self.config.api_url(&self.env))
            .field("credentials", self.auth.credentials())
            .field("tables", &self.tables.len())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Create a connection, resolving credentials
    pub fn new(id: impl Into<String>, config: ConnectionConfig, env: EnvProfile) -> Result<Self> {
        config.validate()?;
        let auth = Authenticator::resolve(&config, &env)?;
        let id = id.into();
        let cache = Arc::new(ConnectionCache::new());
        let resolver = PartitionResolver::new(id.clone(), cache.clone(), Catalog::default());

        info!(connection = %id, "Connection configured");
        Ok(Self {
            id,
            config,
            env,
            auth,
            cache,
            resolver,
            tables: Arc::new(BUILTIN_TABLES.clone()),
            api: None,
        })
    }

    /// Use a different region/zone catalog
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.cache.invalidate();
        self.resolver = PartitionResolver::new(self.id.clone(), self.cache.clone(), catalog);
        self
    }

    /// Use a different table set
    #[must_use]
    pub fn with_tables(mut self, tables: TableRegistry) -> Self {
        self.tables = Arc::new(tables);
        self
    }

    /// Use an existing API handle instead of building an HTTP client
    #[must_use]
    pub fn with_api(mut self, api: Arc<dyn ResourceApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Connection identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Connection configuration
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Catalog partitions are validated against
    pub fn catalog(&self) -> &Catalog {
        self.resolver.catalog()
    }

    /// Tables available on this connection
    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    /// Look up a table
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables.require(name)
    }

    /// Region matrix, resolved once per connection
    pub fn regions(&self) -> Result<PartitionList> {
        self.resolver.regions(
            self.config.region_patterns(),
            self.env.default_region.as_deref(),
        )
    }

    /// Zone matrix, resolved once per connection
    pub fn zones(&self) -> Result<PartitionList> {
        self.resolver.zones(
            self.config.zone_patterns(),
            self.config.region_patterns(),
            self.env.default_zone.as_deref(),
        )
    }

    /// Matrix items for a scope
    pub fn matrix(&self, scope: Scope) -> Result<Vec<MatrixItem>> {
        let router = match scope {
            Scope::Global => MatrixRouter::global(),
            Scope::Region => MatrixRouter::new(scope, self.regions()?),
            Scope::Zone => MatrixRouter::new(scope, self.zones()?),
        };
        router.partitions()
    }

    /// API client, built once per connection
    pub fn client(&self) -> Result<Arc<dyn ResourceApi>> {
        if let Some(api) = &self.api {
            return Ok(api.clone());
        }
        let key = CacheKey::new(self.id.clone(), CacheEntry::ApiClient);
        self.cache.clients().get_or_try_init(&key, || {
            let url = self.config.api_url(&self.env);
            let api = ScalewayApi::new(&url, &self.config.http, &self.auth)?
                .with_object_storage_url(self.config.object_storage_url());
            debug!(connection = %self.id, url = %url, "Built API client");
            Ok(Arc::new(api) as Arc<dyn ResourceApi>)
        })
    }

    /// Drop cached matrices and the client
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// List a table
    ///
    /// Partitions are fetched concurrently and their rows merged into one
    /// stream. A `zone`/`region` qual restricts the fan-out to that
    /// partition; key-column quals are sent to the API and every other qual
    /// filters rows after mapping. Key-column quals are also re-checked on
    /// the mapped rows since the API may return partial matches. The stream ends after `ctx.limit` rows or at the
    /// first upstream error.
    pub fn list(&self, table_name: &str, ctx: &QueryContext) -> Result<RowStream> {
        let table = self.table(table_name)?.clone();
        let plan = table.plan_quals(&ctx.quals)?;

        let mut items = self.matrix(table.scope)?;
        if let Some(partition) = &plan.partition {
            self.check_partition(table.scope, partition)?;
            items.retain(|item| item.partition(table.scope) == Some(partition.as_str()));
        }

        let parent = match &table.list.parent {
            Some(parent) => Some((self.table(&parent.table)?.clone(), parent.clone())),
            None => None,
        };

        let api = self.client()?;
        let config = FetchConfig::new()
            .with_page_size(self.config.page_size)
            .with_row_limit(ctx.limit)
            .with_concurrency(self.config.max_concurrency);

        info!(
            table = %table.name,
            partitions = items.len(),
            limit = ?ctx.limit,
            "Listing table"
        );

        // The API matches key-column quals loosely, so they are checked again
        // on the mapped rows alongside the other filters.
        let mut filters = plan.filters;
        filters.extend(plan.api.iter().cloned());

        // Items dropped by a client-side filter must not count towards the limit
        let row_limit = if filters.is_empty() { ctx.limit } else { None };
        let task = Arc::new(ListTask {
            table,
            parent,
            api,
            owner: self.owner_params(),
            api_quals: plan.api,
            filters,
            page_size: config.page_size_max,
            row_limit,
        });

        Ok(fan_out(items, &config, move |item, sink| {
            let task = task.clone();
            async move { task.run(item, sink).await }
        }))
    }

    /// Get one resource by its key columns
    ///
    /// Without a `zone`/`region` qual every partition of the matrix is tried
    /// in order until one has the resource. A qual naming a partition outside
    /// the configured matrix finds nothing. Returns `None` when no partition
    /// has it.
    pub async fn get(&self, table_name: &str, quals: &HashMap<String, String>) -> Result<Option<Row>> {
        let table = self.table(table_name)?;
        let get = table.get.as_ref().ok_or_else(|| Error::GetNotSupported {
            table: table.name.clone(),
        })?;

        for column in &get.key_columns {
            if !quals.contains_key(column) {
                return Err(Error::MissingKeyColumn {
                    table: table.name.clone(),
                    column: column.clone(),
                });
            }
        }

        let mut items = self.matrix(table.scope)?;
        if let Some(partition) = table.scope.key().and_then(|key| quals.get(key)) {
            self.check_partition(table.scope, partition)?;
            items.retain(|item| item.partition(table.scope) == Some(partition.as_str()));
            if items.is_empty() {
                debug!(table = %table.name, partition = %partition, "Partition outside the matrix");
                return Ok(None);
            }
        }

        let api = self.client()?;
        for item in items {
            let mut vars: StringMap = quals.clone();
            vars.extend(item.values.clone());
            let path = template::render(&get.path, &vars)?;
            let request = GetRequest::new(path).with_unwrap_key(get.unwrap_key.clone());

            let found = get_one(api.get(&request))
                .await
                .map_err(|e| e.upstream(table.name.clone(), item.id.clone()))?;
            if let Some(value) = found {
                debug!(table = %table.name, partition = %item.id, "Resource found");
                return Ok(Some(table.map_row(&value, &item)));
            }
        }
        Ok(None)
    }

    fn check_partition(&self, scope: Scope, partition: &str) -> Result<()> {
        if self.catalog().contains(scope, partition) {
            Ok(())
        } else {
            Err(Error::UnknownPartition {
                kind: scope.to_string(),
                partition: partition.to_string(),
            })
        }
    }

    fn owner_params(&self) -> Vec<(String, String)> {
        [
            (OwnerFilter::Organization, self.config.organization_id(&self.env)),
            (OwnerFilter::Project, self.config.project_id(&self.env)),
        ]
        .into_iter()
        .filter_map(|(owner, value)| value.map(|v| (owner.param().to_string(), v)))
        .collect()
    }
}
