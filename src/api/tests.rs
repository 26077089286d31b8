//! Tests for the provider API module

use super::*;
use crate::auth::{Authenticator, CredentialSource, Credentials};
use crate::config::HttpSettings;
use crate::engine::fetch_all;
use crate::error::Error;
use crate::pagination::{PageCursor, PaginationConfig, TotalCountSource};
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> ScalewayApi {
    let settings = HttpSettings {
        max_retries: 0,
        rate_limit: None,
        ..HttpSettings::default()
    };
    let auth = Authenticator::new(Credentials {
        access_key: "SCWACCESS".into(),
        secret_key: "secret-token".into(),
        source: CredentialSource::Config,
    });
    ScalewayApi::new(&server.uri(), &settings, &auth).unwrap()
}

#[tokio::test]
async fn test_list_page_body_total() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rdb/v1/regions/fr-par/instances"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "2"))
        .and(query_param("organization_id", "org-1"))
        .and(header("X-Auth-Token", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instances": [{"id": "i1"}, {"id": "i2"}],
            "total_count": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ListRequest::new("/rdb/v1/regions/fr-par/instances", "instances")
        .with_query("organization_id", "org-1");
    let page = api(&server)
        .list_page(&request, PageCursor::first(2))
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.items[1]["id"], "i2");
    assert_eq!(page.total_count, Some(5));
}

#[tokio::test]
async fn test_list_page_header_total() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instance/v1/zones/fr-par-1/servers"))
        .and(query_param("per_page", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-total-count", "1")
                .set_body_json(json!({"servers": [{"id": "s1"}]})),
        )
        .mount(&server)
        .await;

    let request = ListRequest::new("/instance/v1/zones/fr-par-1/servers", "servers")
        .with_pagination(Some(PaginationConfig::per_page()));
    let page = api(&server)
        .list_page(&request, PageCursor::first(100))
        .await
        .unwrap();

    assert_eq!(page.total_count, Some(1));
}

#[tokio::test]
async fn test_list_page_unpaginated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/billing/v2beta1/consumptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "consumptions": [{"value": 1}, {"value": 2}, {"value": 3}]
        })))
        .mount(&server)
        .await;

    let request =
        ListRequest::new("/billing/v2beta1/consumptions", "consumptions").with_pagination(None);
    let page = api(&server)
        .list_page(&request, PageCursor::first(100))
        .await
        .unwrap();

    assert_eq!(page.total_count, Some(3));
    let received = &server.received_requests().await.unwrap()[0];
    assert!(received.url.query().is_none());
}

#[tokio::test]
async fn test_list_page_missing_items_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/registry/v1/regions/fr-par/namespaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_count": 0})))
        .mount(&server)
        .await;

    let request = ListRequest::new("/registry/v1/regions/fr-par/namespaces", "namespaces");
    let page = api(&server)
        .list_page(&request, PageCursor::first(10))
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total_count, Some(0));
}

#[tokio::test]
async fn test_list_page_items_not_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"things": "nope"})))
        .mount(&server)
        .await;

    let request = ListRequest::new("/x", "things");
    let err = api(&server)
        .list_page(&request, PageCursor::first(10))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_get_unwraps_resource() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instance/v1/zones/fr-par-1/servers/s1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"server": {"id": "s1", "name": "web"}})),
        )
        .mount(&server)
        .await;

    let request = GetRequest::new("/instance/v1/zones/fr-par-1/servers/s1")
        .with_unwrap_key(Some("server".into()));
    let item = api(&server).get(&request).await.unwrap();
    assert_eq!(item, json!({"id": "s1", "name": "web"}));
}

#[tokio::test]
async fn test_get_without_unwrap() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rdb/v1/regions/fr-par/instances/i1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "i1"})))
        .mount(&server)
        .await;

    let item = api(&server)
        .get(&GetRequest::new("/rdb/v1/regions/fr-par/instances/i1"))
        .await
        .unwrap();
    assert_eq!(item["id"], "i1");
}

#[tokio::test]
async fn test_get_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iam/v1alpha1/users/u1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "type": "not_found", "resource": "user"
        })))
        .mount(&server)
        .await;

    let err = api(&server)
        .get(&GetRequest::new("/iam/v1alpha1/users/u1"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_pages_with_fetch_all() {
    let server = MockServer::start().await;

    for (page, ids) in [("1", vec!["a", "b"]), ("2", vec!["c", "d"]), ("3", vec!["e"])] {
        let items: Vec<_> = ids.iter().map(|id| json!({"id": id})).collect();
        Mock::given(method("GET"))
            .and(path("/k8s/v1/regions/fr-par/clusters"))
            .and(query_param("page", page))
            .and(query_param("page_size", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "clusters": items,
                "total_count": 5
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let api = api(&server);
    let request = ListRequest::new("/k8s/v1/regions/fr-par/clusters", "clusters");
    let mut rows = Vec::new();
    let stats = fetch_all(&ListPages::new(&api, &request), None, 2, &mut rows)
        .await
        .unwrap();

    let ids: Vec<&str> = rows.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(stats.pages_fetched, 3);
}

#[tokio::test]
async fn test_list_page_object_storage() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/storage/nl-ams/"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-content-sha256"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<ListAllMyBucketsResult><Owner><ID>SCWACCESS:proj-9</ID></Owner>\
             <Buckets><Bucket><Name>only</Name></Bucket></Buckets></ListAllMyBucketsResult>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server).with_object_storage_url(format!("{}/storage/{{region}}", server.uri()));
    let request = ListRequest::new("/", "Buckets.Bucket")
        .with_pagination(None)
        .with_endpoint(Endpoint::ObjectStorage {
            region: "nl-ams".into(),
        });
    let page = api.list_page(&request, PageCursor::first(100)).await.unwrap();

    assert_eq!(page.items, vec![json!({"Name": "only", "Project": "proj-9"})]);
    assert_eq!(page.total_count, Some(1));
    let received = &server.received_requests().await.unwrap()[0];
    assert!(received.headers.get("X-Auth-Token").is_none());
}

#[test]
fn test_request_builders() {
    let request = ListRequest::new("/p", "items")
        .with_query("name", "web")
        .with_query("tags", "prod");
    assert_eq!(request.query.len(), 2);
    assert_eq!(
        request.pagination.as_ref().map(|p| &p.total),
        Some(&TotalCountSource::Body("total_count".into()))
    );

    assert_eq!(request.endpoint, Endpoint::Api);

    let get = GetRequest::new("/p/1");
    assert!(get.unwrap_key.is_none());
}
