//! Authentication types

use std::fmt;

/// Header carrying the secret key on every provider request
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Where a set of credentials came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The connection configuration
    Config,
    /// `SCW_ACCESS_KEY` / `SCW_SECRET_KEY`
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => f.write_str("connection config"),
            CredentialSource::Environment => f.write_str("environment"),
        }
    }
}

/// A resolved access key / secret key pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key (identifies the key, not secret)
    pub access_key: String,
    /// Secret key (sent as the auth token)
    pub secret_key: String,
    /// Origin of the pair
    pub source: CredentialSource,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("source", &self.source)
            .finish()
    }
}
