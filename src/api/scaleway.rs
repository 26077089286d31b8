//! HTTP implementation of the provider API

use super::object_storage::{ObjectStorage, DEFAULT_OBJECT_STORAGE_URL};
use super::types::{Endpoint, GetRequest, ListRequest, ResourceApi};
use crate::auth::Authenticator;
use crate::config::HttpSettings;
use crate::engine::PageSource;
use crate::error::{Error, Result};
use crate::http::{HttpClient, JsonResponse, RequestConfig};
use crate::pagination::{Page, PageCursor, TotalCountSource};
use crate::types::JsonValue;
use async_trait::async_trait;
use tracing::debug;

/// Provider API over HTTPS, authenticated with `X-Auth-Token`
///
/// Object storage listings go to the region's S3-compatible endpoint
/// instead.
#[derive(Debug)]
pub struct ScalewayApi {
    http: HttpClient,
    object_storage: ObjectStorage,
}

impl ScalewayApi {
    /// Build a client for an endpoint
    pub fn new(api_url: &str, settings: &HttpSettings, auth: &Authenticator) -> Result<Self> {
        let mut config = settings.client_config(api_url);
        auth.apply(&mut config);

        Ok(Self {
            http: HttpClient::with_config(config)?,
            object_storage: ObjectStorage::new(
                DEFAULT_OBJECT_STORAGE_URL,
                settings,
                auth.credentials(),
            )?,
        })
    }

    /// Use another object storage endpoint template (`{region}` placeholder)
    #[must_use]
    pub fn with_object_storage_url(mut self, url_template: impl Into<String>) -> Self {
        self.object_storage = self.object_storage.with_url_template(url_template);
        self
    }

    async fn list_object_storage(&self, request: &ListRequest, region: &str) -> Result<Page<JsonValue>> {
        let items = self
            .object_storage
            .list(region, &request.path, &request.query, &request.items_key)
            .await?;
        let total = items.len() as u64;
        Ok(Page::new(items, Some(total)))
    }
}

#[async_trait]
impl ResourceApi for ScalewayApi {
    async fn list_page(&self, request: &ListRequest, cursor: PageCursor) -> Result<Page<JsonValue>> {
        if let Endpoint::ObjectStorage { region } = &request.endpoint {
            return self.list_object_storage(request, region).await;
        }

        let mut config = RequestConfig::new().queries(request.query.iter().cloned());
        if let Some(pagination) = &request.pagination {
            config = config.queries(pagination.params(cursor));
        }

        let response = self.http.get_json(&request.path, config).await?;
        let items = extract_items(&response.body, &request.items_key)?;

        let total_count = match &request.pagination {
            None => Some(items.len() as u64),
            Some(pagination) => total_count(&response, &pagination.total),
        };

        debug!(
            path = %request.path,
            page = cursor.page,
            items = items.len(),
            total = ?total_count,
            "Listed page"
        );
        Ok(Page::new(items, total_count))
    }

    async fn get(&self, request: &GetRequest) -> Result<JsonValue> {
        let response = self.http.get_json(&request.path, RequestConfig::new()).await?;
        match &request.unwrap_key {
            None => Ok(response.body),
            Some(key) => match response.body {
                JsonValue::Object(mut map) => map
                    .remove(key)
                    .ok_or_else(|| Error::decode(format!("response has no '{key}' field"))),
                other => Err(Error::decode(format!(
                    "expected an object wrapping '{key}', got {other}"
                ))),
            },
        }
    }
}

/// Item array of a list response; a missing or null field is an empty page
fn extract_items(body: &JsonValue, key: &str) -> Result<Vec<JsonValue>> {
    match body.get(key) {
        Some(JsonValue::Array(items)) => Ok(items.clone()),
        Some(JsonValue::Null) | None if body.is_object() || body.is_null() => Ok(Vec::new()),
        Some(other) => Err(Error::decode(format!(
            "field '{key}' is not an array: {other}"
        ))),
        None => Err(Error::decode(format!("expected an object with '{key}'"))),
    }
}

fn total_count(response: &JsonResponse, source: &TotalCountSource) -> Option<u64> {
    match source {
        TotalCountSource::Body(field) => response.body.get(field).and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        }),
        TotalCountSource::Header(name) => response.header_u64(name),
        TotalCountSource::None => None,
    }
}

/// Pages of one list request, for the fetch loop
pub struct ListPages<'a> {
    api: &'a dyn ResourceApi,
    request: &'a ListRequest,
}

impl<'a> ListPages<'a> {
    /// Pair an API handle with a request
    pub fn new(api: &'a dyn ResourceApi, request: &'a ListRequest) -> Self {
        Self { api, request }
    }
}

#[async_trait]
impl PageSource<JsonValue> for ListPages<'_> {
    async fn fetch_page(&self, cursor: PageCursor) -> Result<Page<JsonValue>> {
        self.api.list_page(self.request, cursor).await
    }
}
