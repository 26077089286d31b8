//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: connection config → matrix fan-out →
//! paginated HTTP requests → mapped rows → Parquet output

use futures::StreamExt;
use scaleway_inventory::config::{ConnectionConfig, EnvProfile};
use scaleway_inventory::engine::collect_rows;
use scaleway_inventory::output::{ParquetWriter, ParquetWriterConfig};
use scaleway_inventory::tables::QueryContext;
use scaleway_inventory::{Connection, Error, Row};
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn env() -> EnvProfile {
    EnvProfile::from_vars([
        ("SCW_ACCESS_KEY", "SCWTESTACCESSKEY"),
        ("SCW_SECRET_KEY", "test-secret"),
        ("SCW_DEFAULT_ORGANIZATION_ID", "org-1"),
    ])
}

fn connect(server: &MockServer, extra: &str) -> Connection {
    let yaml = format!(
        r"
api_url: {}
http:
  max_retries: 2
  rate_limit: null
  backoff:
    type: constant
    initial_ms: 1
    max_ms: 5
{extra}
",
        server.uri()
    );
    let config = ConnectionConfig::from_yaml(&yaml).unwrap();
    Connection::new("it", config, env()).unwrap()
}

fn names(rows: &[Row]) -> Vec<String> {
    let mut names: Vec<String> = rows
        .iter()
        .map(|row| row["name"].as_str().unwrap_or_default().to_string())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_zoned_table_across_zones_and_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instance/v1/zones/fr-par-1/servers"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .and(header("X-Auth-Token", "test-secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-total-count", "3")
                .set_body_json(json!({"servers": [
                    {"id": "s1", "name": "web-1", "state": "running"},
                    {"id": "s2", "name": "web-2", "state": "stopped"}
                ]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/instance/v1/zones/fr-par-1/servers"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-total-count", "3")
                .set_body_json(json!({"servers": [
                    {"id": "s3", "name": "web-3", "state": "running"}
                ]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/instance/v1/zones/nl-ams-1/servers"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-total-count", "1")
                .set_body_json(json!({"servers": [
                    {"id": "a1", "name": "ams-1", "state": "running"}
                ]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let connection = connect(&server, "page_size: 2\nzones: [\"fr-par-1\", \"*-ams-1\"]");
    let stream = connection
        .list("scaleway_instance_server", &QueryContext::new())
        .unwrap();
    let rows = collect_rows(stream).await.unwrap();

    assert_eq!(names(&rows), vec!["ams-1", "web-1", "web-2", "web-3"]);
    let ams = rows.iter().find(|r| r["id"] == "a1").unwrap();
    assert_eq!(ams["zone"], "nl-ams-1");
}

#[tokio::test]
async fn test_limit_shrinks_page_and_stops_fetching() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rdb/v1/regions/fr-par/instances"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instances": [{"id": "db-1", "name": "main"}],
            "total_count": 40
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = connect(&server, "regions: [\"fr-par\"]");
    let ctx = QueryContext::new().with_limit(Some(1));
    let rows = collect_rows(connection.list("scaleway_rdb_instance", &ctx).unwrap())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["region"], "fr-par");
}

#[tokio::test]
async fn test_retries_transient_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rdb/v1/regions/fr-par/instances"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rdb/v1/regions/fr-par/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instances": [{"id": "db-1", "name": "main"}],
            "total_count": 1
        })))
        .mount(&server)
        .await;

    let connection = connect(&server, "regions: [\"fr-par\"]");
    let rows = collect_rows(
        connection
            .list("scaleway_rdb_instance", &QueryContext::new())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_upstream_error_names_partition() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rdb/v1/regions/fr-par/instances"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&server)
        .await;

    let connection = connect(&server, "regions: [\"fr-par\"]");
    let mut stream = connection
        .list("scaleway_rdb_instance", &QueryContext::new())
        .unwrap();

    let err = match stream.next().await {
        Some(Err(err)) => err,
        other => panic!("expected an error, got {other:?}"),
    };
    match &err {
        Error::Upstream {
            table, partition, ..
        } => {
            assert_eq!(table, "scaleway_rdb_instance");
            assert_eq!(partition, "fr-par");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_retryable());
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_invalid_pattern_fails_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let connection = connect(&server, "zones: [\"mars-*\", \"fr-par-1\", \"[oops\"]");
    let err = match connection.list("scaleway_instance_server", &QueryContext::new()) {
        Err(err) => err,
        Ok(_) => panic!("expected a configuration error"),
    };

    assert!(err.is_config());
    let message = err.to_string();
    assert!(message.contains("mars-*"));
    assert!(message.contains("[oops"));
}

#[tokio::test]
async fn test_child_table_lists_parents_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/k8s/v1/regions/fr-par/clusters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "clusters": [{"id": "c1", "name": "prod"}, {"id": "c2", "name": "dev"}],
            "total_count": 2
        })))
        .mount(&server)
        .await;

    for (cluster, pool) in [("c1", "default"), ("c2", "gpu")] {
        Mock::given(method("GET"))
            .and(path(format!("/k8s/v1/regions/fr-par/clusters/{cluster}/pools")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pools": [{"id": format!("{cluster}-p"), "name": pool, "status": "ready"}],
                "total_count": 1
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let connection = connect(&server, "regions: [\"fr-par\"]");
    let rows = collect_rows(
        connection
            .list("scaleway_kubernetes_pool", &QueryContext::new())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(names(&rows), vec!["default", "gpu"]);
    let gpu = rows.iter().find(|r| r["name"] == "gpu").unwrap();
    assert_eq!(gpu["cluster_id"], "c2");
    assert_eq!(gpu["region"], "fr-par");
}

#[tokio::test]
async fn test_global_table_sends_owner_and_maps_money() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/billing/v2beta1/invoices"))
        .and(query_param("organization_id", "org-1"))
        .and(query_param("invoice_type", "periodic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "invoices": [{
                "id": "inv-1",
                "invoice_type": "periodic",
                "total_taxed": {"currency_code": "EUR", "units": 12, "nanos": 500_000_000}
            }],
            "total_count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = connect(&server, "");
    let ctx = QueryContext::new().with_qual("invoice_type", "periodic");
    let rows = collect_rows(connection.list("scaleway_billing_invoice", &ctx).unwrap())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["total_taxed_amount"], json!(12.5));
    assert_eq!(rows[0]["currency"], "EUR");
}

#[tokio::test]
async fn test_object_buckets_listed_per_region() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s3/fr-par/"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner><ID>SCWTESTACCESSKEY:proj-1</ID><DisplayName>SCWTESTACCESSKEY:proj-1</DisplayName></Owner>
  <Buckets>
    <Bucket><Name>backups</Name><CreationDate>2024-03-01T10:00:00.000Z</CreationDate></Bucket>
    <Bucket><Name>logs</Name><CreationDate>2024-04-02T08:30:00.000Z</CreationDate></Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/s3/nl-ams/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<ListAllMyBucketsResult><Owner><ID>SCWTESTACCESSKEY:proj-1</ID></Owner><Buckets></Buckets></ListAllMyBucketsResult>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let extra = format!(
        "regions: [\"fr-par\", \"nl-ams\"]\nobject_storage_url: \"{}/s3/{{region}}\"",
        server.uri()
    );
    let connection = connect(&server, &extra);
    let rows = collect_rows(
        connection
            .list("scaleway_object_bucket", &QueryContext::new())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(names(&rows), vec!["backups", "logs"]);
    let logs = rows.iter().find(|r| r["name"] == "logs").unwrap();
    assert_eq!(logs["region"], "fr-par");
    assert_eq!(logs["project"], "proj-1");
    assert_eq!(logs["creation_date"], "2024-04-02T08:30:00.000Z");

    for request in server.received_requests().await.unwrap() {
        assert!(request.headers.get("x-auth-token").is_none());
        let authorization = request.headers["authorization"].to_str().unwrap();
        assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=SCWTESTACCESSKEY/"));
        let region = request.url.path().trim_matches('/').trim_start_matches("s3/");
        assert!(authorization.contains(&format!("/{region}/s3/aws4_request")));
    }
}

#[tokio::test]
async fn test_object_storage_error_names_region() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s3/pl-waw/"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
        ))
        .mount(&server)
        .await;

    let extra = format!(
        "regions: [\"pl-waw\"]\nobject_storage_url: \"{}/s3/{{region}}\"",
        server.uri()
    );
    let connection = connect(&server, &extra);
    let err = collect_rows(
        connection
            .list("scaleway_object_bucket", &QueryContext::new())
            .unwrap(),
    )
    .await
    .unwrap_err();

    match err {
        Error::Upstream {
            table,
            partition,
            source,
        } => {
            assert_eq!(table, "scaleway_object_bucket");
            assert_eq!(partition, "pl-waw");
            assert!(source.to_string().contains("AccessDenied"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Get
// ============================================================================

#[tokio::test]
async fn test_get_searches_zones_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/instance/v1/zones/fr-par-1/servers/s9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"type": "not_found"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/instance/v1/zones/fr-par-2/servers/s9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server": {"id": "s9", "name": "found", "state": "running"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connection = connect(&server, "zones: [\"fr-par-1\", \"fr-par-2\"]");
    let quals = HashMap::from([("id".to_string(), "s9".to_string())]);
    let row = connection
        .get("scaleway_instance_server", &quals)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(row["name"], "found");
    assert_eq!(row["zone"], "fr-par-2");
}

#[tokio::test]
async fn test_get_missing_everywhere_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let connection = connect(&server, "regions: [\"fr-par\", \"nl-ams\"]");
    let quals = HashMap::from([("id".to_string(), "nope".to_string())]);
    let row = connection
        .get("scaleway_rdb_instance", &quals)
        .await
        .unwrap();

    assert!(row.is_none());
}

// ============================================================================
// Output
// ============================================================================

#[tokio::test]
async fn test_listed_rows_written_to_parquet() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rdb/v1/regions/fr-par/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "instances": [
                {"id": "db-1", "name": "main", "created_at": "2024-01-02T03:04:05Z"},
                {"id": "db-2", "name": "replica", "created_at": null}
            ],
            "total_count": 2
        })))
        .mount(&server)
        .await;

    let connection = connect(&server, "regions: [\"fr-par\"]");
    let rows = collect_rows(
        connection
            .list("scaleway_rdb_instance", &QueryContext::new())
            .unwrap(),
    )
    .await
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("rdb.parquet");
    let table = connection.table("scaleway_rdb_instance").unwrap();
    let mut writer = ParquetWriter::create(&file, table, &ParquetWriterConfig::new()).unwrap();
    writer.write_rows(&rows).unwrap();

    assert_eq!(writer.close().unwrap(), 2);
    assert!(std::fs::metadata(&file).unwrap().len() > 0);
}
