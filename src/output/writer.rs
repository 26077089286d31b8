//! Parquet writer for table rows

use super::schema::{rows_to_batch, table_schema};
use crate::error::{Error, Result};
use crate::tables::Table;
use crate::types::Row;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Configuration for the Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 64 * 1024,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(ZstdLevel::default());
        self
    }

    /// Row group size
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Writes rows of one table to Parquet
pub struct ParquetWriter<W: Write + Send> {
    table: Table,
    writer: ArrowWriter<W>,
    rows_written: usize,
}

impl ParquetWriter<File> {
    /// Create a Parquet file for a table
    pub fn create(path: impl AsRef<Path>, table: &Table, config: &ParquetWriterConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| Error::output(format!("Failed to create file '{}': {e}", path.display())))?;
        Self::new(file, table, config)
    }
}

impl<W: Write + Send> ParquetWriter<W> {
    /// Write a table's rows into any writer
    pub fn new(sink: W, table: &Table, config: &ParquetWriterConfig) -> Result<Self> {
        let schema = Arc::new(table_schema(table));
        let writer = ArrowWriter::try_new(sink, schema, Some(config.build_properties()))
            .map_err(|e| Error::output(format!("Failed to create Parquet writer: {e}")))?;

        Ok(Self {
            table: table.clone(),
            writer,
            rows_written: 0,
        })
    }

    /// Convert and write a chunk of rows
    pub fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let batch = rows_to_batch(&self.table, rows)?;
        self.write_batch(&batch)
    }

    /// Write a record batch built from this table's schema
    pub fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch)?;
        self.rows_written += batch.num_rows();
        debug!(
            table = %self.table.name,
            rows = batch.num_rows(),
            total = self.rows_written,
            "Wrote batch"
        );
        Ok(())
    }

    /// Rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Finish the file, returning the number of rows written
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close()?;
        Ok(rows)
    }
}
