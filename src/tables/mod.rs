//! Table definitions
//!
//! A table maps one provider resource to rows: where to list it, how to get
//! one item, which quals the API understands and which columns come out.
//!
//! # Overview
//!
//! - [`Table`] - Definition with list/get operations and typed columns
//! - [`TableRegistry`] - Name lookup over a set of tables
//! - [`BUILTIN_TABLES`] - The provider resources shipped with the crate

mod mapping;
mod registry;
mod types;

pub use mapping::{lookup, row_matches};
pub use registry::{get_builtin, list_builtin, TableRegistry, BUILTIN_TABLES};
pub use types::{
    Column, ColumnSource, GetConfig, ListConfig, OwnerFilter, ParentConfig, QualPlan,
    QueryContext, Table, Transform,
};
