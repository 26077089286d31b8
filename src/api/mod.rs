//! Provider API module
//!
//! The `ResourceApi` trait is the only thing the table layer knows about the
//! provider: list one page of a partition, or get one resource. `ScalewayApi`
//! implements it over HTTP; tests substitute their own implementation.
//!
//! Most listings come from the JSON API. Object storage listings go to the
//! region's S3-compatible endpoint, signed with AWS signature V4, and their
//! XML answers are converted to JSON before row mapping.

mod object_storage;
mod scaleway;
mod types;
mod xml;

pub use object_storage::{ObjectStorage, SigV4Signer, DEFAULT_OBJECT_STORAGE_URL};
pub use scaleway::{ListPages, ScalewayApi};
pub use types::{Endpoint, GetRequest, ListRequest, ResourceApi};

#[cfg(test)]
mod tests;
