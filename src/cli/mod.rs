//! CLI module
//!
//! Command-line interface over a single connection.
//!
//! # Commands
//!
//! - `tables` - List available tables
//! - `columns` - Show a table's columns and key columns
//! - `matrix` - Show the resolved region or zone matrix
//! - `query` - List rows, optionally writing Parquet
//! - `get` - Fetch one resource by key
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{parse_qual, Cli, Commands, OutputFormat, ScopeArg};
pub use runner::Runner;
pub use server::{router, serve};
