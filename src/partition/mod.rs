//! Partition module
//!
//! Supports: region matrix, zone matrix, parent resources
//!
//! # Overview
//!
//! The provider's API is split by region (`fr-par`) or zone (`fr-par-1`).
//! A logical table query runs once per partition of its "matrix" and the
//! results are merged. This module resolves the matrix from configuration
//! and turns it (or a set of parent records) into matrix items.

mod glob;
mod resolver;
mod routers;
mod types;

pub use glob::GlobPattern;
pub use resolver::{default_partition, match_patterns, resolve_uncached, PartitionResolver};
pub use routers::{MatrixRouter, ParentRouter};
pub use types::{MatrixItem, PartitionList, PartitionRouter, PartitionSource};

#[cfg(test)]
mod tests;
