//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ConnectionConfig, EnvProfile};
use crate::connection::Connection;
use crate::error::{Error, Result, ResultExt};
use crate::output::{ParquetWriter, ParquetWriterConfig};
use crate::tables::{QueryContext, Table, BUILTIN_TABLES};
use crate::types::{Row, Scope};
use futures::StreamExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Rows buffered before a Parquet row group is written
const PARQUET_CHUNK_ROWS: usize = 1000;

/// Identifier of the connection built from CLI options
const CLI_CONNECTION_ID: &str = "default";

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Tables => self.tables(),
            Commands::Columns { table } => self.columns(table),
            Commands::Matrix { scope } => self.matrix((*scope).into()),
            Commands::Query {
                table,
                quals,
                limit,
                output,
            } => self.query(table, quals, *limit, output.as_deref()).await,
            Commands::Get { table, quals } => self.get(table, quals).await,
            Commands::Serve { port } => {
                let connection = Arc::new(self.connect()?);
                crate::cli::serve(connection, *port).await
            }
        }
    }

    /// Load configuration; inline JSON takes precedence over the file
    fn load_config(&self) -> Result<ConnectionConfig> {
        if let Some(json) = &self.cli.config_json {
            return ConnectionConfig::from_json(json).context("Invalid --config-json");
        }
        if let Some(path) = &self.cli.config {
            return ConnectionConfig::from_file(path);
        }
        Ok(ConnectionConfig::default())
    }

    /// Build the connection from config and the process environment
    fn connect(&self) -> Result<Connection> {
        let config = self.load_config()?;
        Connection::new(CLI_CONNECTION_ID, config, EnvProfile::from_env())
    }

    /// List tables
    fn tables(&self) -> Result<()> {
        let tables: Vec<Value> = BUILTIN_TABLES
            .tables()
            .iter()
            .map(|table| {
                json!({
                    "name": table.name,
                    "description": table.description,
                    "scope": table.scope,
                    "service": table.list.service,
                    "get": table.get.is_some(),
                    "parent": table.list.parent.as_ref().map(|p| p.table.clone()),
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "TABLES",
            "tables": tables
        }));
        Ok(())
    }

    /// Show the columns of one table
    fn columns(&self, name: &str) -> Result<()> {
        let table = crate::tables::get_builtin(name).ok_or_else(|| Error::table_not_found(name))?;

        let columns: Vec<Value> = table
            .columns
            .iter()
            .map(|column| {
                json!({
                    "name": column.name,
                    "type": column.ty,
                    "description": column.description,
                })
            })
            .collect();

        let key_columns = table
            .get
            .as_ref()
            .map(|get| get.key_columns.clone())
            .unwrap_or_default();

        self.output_message(&json!({
            "type": "COLUMNS",
            "table": table.name,
            "scope": table.scope,
            "key_columns": key_columns,
            "list_key_columns": table.list.key_columns,
            "columns": columns
        }));
        Ok(())
    }

    /// Show the resolved matrix
    fn matrix(&self, scope: Scope) -> Result<()> {
        let connection = self.connect()?;
        let items = connection.matrix(scope)?;
        let partitions: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();

        self.output_message(&json!({
            "type": "MATRIX",
            "scope": scope,
            "partitions": partitions
        }));
        Ok(())
    }

    /// List table rows
    async fn query(
        &self,
        table_name: &str,
        quals: &[(String, String)],
        limit: Option<u64>,
        output: Option<&Path>,
    ) -> Result<()> {
        let start = Instant::now();
        let connection = self.connect()?;
        let table = connection.table(table_name)?.clone();

        let mut ctx = QueryContext::new().with_limit(limit);
        for (column, value) in quals {
            ctx = ctx.with_qual(column.clone(), value.clone());
        }

        let mut stream = connection.list(table_name, &ctx)?;
        let mut writer = match (self.cli.format, output) {
            (OutputFormat::Parquet, None) => {
                return Err(Error::config("Parquet format requires --output file"));
            }
            (_, Some(path)) => Some(ParquetWriter::create(
                path,
                &table,
                &ParquetWriterConfig::default(),
            )?),
            (_, None) => None,
        };

        let mut buffer: Vec<Row> = Vec::new();
        let mut rows = 0usize;
        while let Some(row) = stream.next().await {
            let row = row?;
            rows += 1;

            if self.cli.format != OutputFormat::Parquet {
                self.output_record(&table, &row);
            }
            if let Some(writer) = writer.as_mut() {
                buffer.push(row);
                if buffer.len() >= PARQUET_CHUNK_ROWS {
                    writer.write_rows(&buffer)?;
                    buffer.clear();
                }
            }
        }

        if let Some(mut writer) = writer {
            writer.write_rows(&buffer)?;
            writer.close()?;
        }

        self.output_message(&json!({
            "type": "QUERY_COMPLETE",
            "table": table.name,
            "rows": rows,
            "duration_ms": start.elapsed().as_millis() as u64
        }));
        Ok(())
    }

    /// Fetch one resource
    async fn get(&self, table_name: &str, quals: &[(String, String)]) -> Result<()> {
        let connection = self.connect()?;
        let quals: HashMap<String, String> = quals.iter().cloned().collect();

        match connection.get(table_name, &quals).await? {
            Some(row) => self.output_message(&json!({
                "type": "RECORD",
                "record": {
                    "table": table_name,
                    "data": row
                }
            })),
            None => self.output_message(&json!({
                "type": "NOT_FOUND",
                "table": table_name,
                "key": quals
            })),
        }
        Ok(())
    }

    fn output_record(&self, table: &Table, row: &Row) {
        self.output_message(&json!({
            "type": "RECORD",
            "record": {
                "table": table.name,
                "data": row,
                "emitted_at": chrono::Utc::now().timestamp_millis()
            }
        }));
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json | OutputFormat::Parquet => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
