//! CLI commands and argument parsing

use crate::types::Scope;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scaleway resource inventory CLI
#[derive(Parser, Debug)]
#[command(name = "scaleway-inventory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connection configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline connection configuration (JSON), takes precedence over --config
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available tables
    Tables,

    /// Show the columns of a table
    Columns {
        /// Table name
        table: String,
    },

    /// Show the resolved region or zone matrix
    Matrix {
        /// Matrix scope
        #[arg(long, default_value = "zone")]
        scope: ScopeArg,
    },

    /// List the rows of a table
    Query {
        /// Table name
        table: String,

        /// Column constraint (`column=value`), repeatable
        #[arg(short = 'w', long = "where", value_parser = parse_qual)]
        quals: Vec<(String, String)>,

        /// Maximum rows to return
        #[arg(long)]
        limit: Option<u64>,

        /// Output file (required for parquet)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch one resource by its key columns
    Get {
        /// Table name
        table: String,

        /// Key column value (`column=value`), repeatable
        #[arg(short = 'w', long = "where", value_parser = parse_qual)]
        quals: Vec<(String, String)>,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one row per line)
    Json,
    /// Human-readable output
    Pretty,
    /// Parquet file
    Parquet,
}

/// Partitioned scopes accepted by `matrix`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScopeArg {
    Region,
    Zone,
}

impl From<ScopeArg> for Scope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Region => Scope::Region,
            ScopeArg::Zone => Scope::Zone,
        }
    }
}

/// Parse a `column=value` pair
pub fn parse_qual(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected column=value, got '{s}'")),
    }
}
