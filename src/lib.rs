// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Scaleway Inventory
//!
//! Exposes Scaleway resources (instances, databases, Kubernetes clusters,
//! IAM, billing and more) as typed tables. Each table lists through the
//! provider API, fanned out across the regions or zones a connection is
//! configured for, and its rows arrive as one merged stream.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use scaleway_inventory::{config::{ConnectionConfig, EnvProfile}, tables::QueryContext, Connection};
//!
//! #[tokio::main]
//! async fn main() -> scaleway_inventory::Result<()> {
//!     let config = ConnectionConfig::from_yaml("zones: [\"fr-par-*\"]")?;
//!     let connection = Connection::new("default", config, EnvProfile::from_env())?;
//!
//!     let ctx = QueryContext::new().with_qual("state", "running").with_limit(Some(50));
//!     let mut rows = connection.list("scaleway_instance_server", &ctx)?;
//!     while let Some(row) = rows.next().await {
//!         println!("{}", row?["name"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Connection                           │
//! │   list(table, quals, limit) → RowStream   get(table, keys)   │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────┬────────────┬────┴──────┬────────────┬────────────┐
//! │ Partition │   Engine   │   Tables  │    API     │   Output   │
//! ├───────────┼────────────┼───────────┼────────────┼────────────┤
//! │ Globs     │ Fan-out    │ Registry  │ Pages      │ Arrow      │
//! │ Matrix    │ Row budget │ Mapping   │ Retry      │ Parquet    │
//! │ Memoize   │ Cancel     │ Quals     │ Rate limit │            │
//! └───────────┴────────────┴───────────┴────────────┴────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Known regions and zones
pub mod catalog;

/// Per-connection memoization
pub mod cache;

/// Region/zone pattern resolution and fan-out matrices
pub mod partition;

/// Page requests and row budgets
pub mod pagination;

/// Paginated fetch loop and concurrent fan-out
pub mod engine;

/// HTTP client with retry and rate limiting
pub mod http;

/// Provider API client
pub mod api;

/// Credential resolution and request signing
pub mod auth;

/// Connection configuration and environment
pub mod config;

/// Path template rendering
pub mod template;

/// Table definitions and row mapping
pub mod tables;

/// Connection facade
pub mod connection;

/// Arrow/Parquet output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Connection;
pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
