//! Credential resolution
//!
//! Credentials come from the connection configuration when either key is
//! set there, otherwise from the environment. Within one source both keys
//! must be present.

use super::types::{CredentialSource, Credentials, AUTH_HEADER};
use crate::config::{ConnectionConfig, EnvProfile};
use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use crate::types::OptionStringExt;
use tracing::debug;

/// Applies resolved credentials to outgoing requests
#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Credentials,
}

impl Authenticator {
    /// Resolve credentials for a connection
    pub fn resolve(config: &ConnectionConfig, env: &EnvProfile) -> Result<Self> {
        let access = config.access_key.clone().none_if_empty();
        let secret = config.secret_key.clone().none_if_empty();

        let (access, secret, source) = if access.is_some() || secret.is_some() {
            (access, secret, CredentialSource::Config)
        } else {
            (
                env.access_key.clone(),
                env.secret_key.clone(),
                CredentialSource::Environment,
            )
        };

        let credentials = match (access, secret) {
            (Some(access_key), Some(secret_key)) => Credentials {
                access_key,
                secret_key,
                source,
            },
            (None, None) => return Err(Error::missing_field("access_key, secret_key")),
            (access, _) => {
                let missing = if access.is_none() {
                    "access_key"
                } else {
                    "secret_key"
                };
                return Err(Error::PartialCredentials {
                    source_name: source.to_string(),
                    missing: missing.to_string(),
                });
            }
        };

        debug!(
            access_key = %credentials.access_key,
            source = %credentials.source,
            "Resolved credentials"
        );
        Ok(Self { credentials })
    }

    /// Create an authenticator from known credentials
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// The resolved credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Add the auth header to an HTTP client configuration
    pub fn apply(&self, config: &mut HttpClientConfig) {
        config
            .default_headers
            .insert(AUTH_HEADER.to_string(), self.credentials.secret_key.clone());
    }
}
