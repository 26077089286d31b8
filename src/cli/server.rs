//! HTTP server mode for REST access to inventory tables

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::connection::Connection;
use crate::engine::collect_rows;
use crate::error::{Error, ErrorClass, Result};
use crate::tables::QueryContext;
use crate::types::Scope;

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    connection: Arc<Connection>,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Build the router over a shared connection
pub fn router(connection: Arc<Connection>) -> Router {
    let state = AppState { connection };

    // Allow all origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tables", get(list_tables))
        .route("/tables/:name", get(describe_table))
        .route("/tables/:name/rows", get(list_rows))
        .route("/tables/:name/get", get(get_row))
        .route("/matrix/:scope", get(show_matrix))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(connection: Arc<Connection>, port: u16) -> Result<()> {
    let app = router(connection);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Map an error to a status code and error body
fn error_response(err: &Error) -> Response {
    let status = match err {
        Error::TableNotFound { .. } => StatusCode::NOT_FOUND,
        Error::MissingKeyColumn { .. } | Error::GetNotSupported { .. } => StatusCode::BAD_REQUEST,
        e if e.is_config() => StatusCode::BAD_REQUEST,
        e if e.classify() == ErrorClass::Upstream => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::<()>::error(err.to_string()))).into_response()
}

/// Split query parameters into a row limit and column quals
fn query_context(mut params: HashMap<String, String>) -> Result<QueryContext> {
    let limit = match params.remove("limit") {
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
            Error::invalid_value("limit", format!("'{raw}' is not a non-negative integer"))
        })?),
        None => None,
    };

    let mut ctx = QueryContext::new().with_limit(limit);
    for (column, value) in params {
        ctx = ctx.with_qual(column, value);
    }
    Ok(ctx)
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// List tables
async fn list_tables(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tables: Vec<Value> = state
        .connection
        .tables()
        .tables()
        .iter()
        .map(|table| {
            json!({
                "name": table.name,
                "description": table.description,
                "scope": table.scope,
            })
        })
        .collect();

    Json(ApiResponse::success(json!({
        "type": "TABLES",
        "tables": tables
    })))
}

/// Describe one table
async fn describe_table(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.connection.table(&name) {
        Ok(table) => (StatusCode::OK, Json(ApiResponse::success(table))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// List rows of a table; query parameters other than `limit` are quals
async fn list_rows(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let result = async {
        let ctx = query_context(params)?;
        let stream = state.connection.list(&name, &ctx)?;
        collect_rows(stream).await
    }
    .await;

    match result {
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(json!({
                "type": "ROWS",
                "table": name,
                "count": rows.len(),
                "rows": rows
            }))),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Fetch one resource; query parameters are key columns
async fn get_row(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match state.connection.get(&name, &params).await {
        Ok(Some(row)) => (StatusCode::OK, Json(ApiResponse::success(row))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!("No matching row in '{name}'"))),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Show the resolved region or zone matrix
async fn show_matrix(
    State(state): State<Arc<AppState>>,
    Path(scope): Path<String>,
) -> Response {
    let scope = match scope.as_str() {
        "region" | "regions" => Scope::Region,
        "zone" | "zones" => Scope::Zone,
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(format!(
                    "Unknown scope '{other}', expected region or zone"
                ))),
            )
                .into_response();
        }
    };

    match state.connection.matrix(scope) {
        Ok(items) => {
            let partitions: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(json!({
                    "type": "MATRIX",
                    "scope": scope,
                    "partitions": partitions
                }))),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}
