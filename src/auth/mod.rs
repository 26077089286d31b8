//! Authentication module
//!
//! Supports: access key / secret key pairs sent as `X-Auth-Token`
//!
//! The `Authenticator` resolves credentials from the connection config or
//! the environment and adds the auth header to the HTTP client.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{CredentialSource, Credentials, AUTH_HEADER};
