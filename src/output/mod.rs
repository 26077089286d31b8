//! Output module
//!
//! Turns table rows into Arrow record batches and Parquet files.
//!
//! # Overview
//!
//! - `table_schema` - Arrow schema from a table's typed columns
//! - `rows_to_batch` - Mapped rows to a `RecordBatch`
//! - `ParquetWriter` - Streams row chunks into a Parquet file

mod schema;
mod writer;

pub use schema::{arrow_type, rows_to_batch, table_schema};
pub use writer::{ParquetWriter, ParquetWriterConfig};
