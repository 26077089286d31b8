//! Connection configuration
//!
//! A connection is configured from YAML or JSON, inline or from a file.
//! Anything left unset falls back to the `SCW_*` environment, which is
//! captured once into an [`EnvProfile`].

use crate::api::DEFAULT_OBJECT_STORAGE_URL;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::MAX_PAGE_SIZE;
use crate::template;
use crate::types::{BackoffType, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Provider API endpoint used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://api.scaleway.com";

// ============================================================================
// Connection Config
// ============================================================================

/// Configuration of one connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Access key (falls back to `SCW_ACCESS_KEY`)
    #[serde(default)]
    pub access_key: Option<String>,

    /// Secret key (falls back to `SCW_SECRET_KEY`)
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Organization filter for organization-scoped tables
    #[serde(default)]
    pub organization_id: Option<String>,

    /// Project filter for project-scoped tables
    #[serde(default)]
    pub project_id: Option<String>,

    /// Region glob patterns (`fr-*`, `pl-waw`)
    #[serde(default)]
    pub regions: Option<Vec<String>>,

    /// Zone glob patterns (`*-1`, `fr-par-[12]`)
    #[serde(default)]
    pub zones: Option<Vec<String>>,

    /// API endpoint (falls back to `SCW_API_URL`, then the public endpoint)
    #[serde(default)]
    pub api_url: Option<String>,

    /// Object storage endpoint template with a `{region}` placeholder
    #[serde(default)]
    pub object_storage_url: Option<String>,

    /// Page size requested from the provider
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Partitions fetched in parallel
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            secret_key: None,
            organization_id: None,
            project_id: None,
            regions: None,
            zones: None,
            api_url: None,
            object_storage_url: None,
            page_size: default_page_size(),
            max_concurrency: default_max_concurrency(),
            http: HttpSettings::default(),
        }
    }
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_max_concurrency() -> usize {
    8
}

impl ConnectionConfig {
    /// Load configuration from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_value(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {}", self.page_size),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(Error::invalid_value("max_concurrency", "must be at least 1"));
        }
        if let Some(url) = &self.api_url {
            Url::parse(url).map_err(|e| Error::invalid_value("api_url", e.to_string()))?;
        }
        if let Some(url) = &self.object_storage_url {
            if !template::placeholders(url).contains(&"region") {
                return Err(Error::invalid_value(
                    "object_storage_url",
                    "must contain a {region} placeholder",
                ));
            }
        }
        self.http.validate()
    }

    /// Region patterns (empty when unset)
    pub fn region_patterns(&self) -> &[String] {
        self.regions.as_deref().unwrap_or_default()
    }

    /// Zone patterns (empty when unset)
    pub fn zone_patterns(&self) -> &[String] {
        self.zones.as_deref().unwrap_or_default()
    }

    /// Effective API URL
    pub fn api_url(&self, env: &EnvProfile) -> String {
        self.api_url
            .clone()
            .or_else(|| env.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Effective object storage endpoint template
    pub fn object_storage_url(&self) -> String {
        self.object_storage_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OBJECT_STORAGE_URL.to_string())
    }

    /// Effective organization filter
    pub fn organization_id(&self, env: &EnvProfile) -> Option<String> {
        self.organization_id
            .clone()
            .or_else(|| env.organization_id.clone())
    }

    /// Effective project filter
    pub fn project_id(&self, env: &EnvProfile) -> Option<String> {
        self.project_id.clone().or_else(|| env.project_id.clone())
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings of a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub backoff: BackoffSettings,

    /// Client-side rate limit (`null` disables it)
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffSettings::default(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

#[allow(clippy::unnecessary_wraps)]
fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

impl HttpSettings {
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("http.timeout_secs", "must be at least 1"));
        }
        if self.backoff.max_ms < self.backoff.initial_ms {
            return Err(Error::invalid_value(
                "http.backoff",
                "max_ms must not be lower than initial_ms",
            ));
        }
        Ok(())
    }

    /// HTTP client configuration for an endpoint
    pub fn client_config(&self, base_url: &str) -> HttpClientConfig {
        HttpClientConfig {
            base_url: Some(base_url.to_string()),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.backoff.initial_ms),
            max_backoff: Duration::from_millis(self.backoff.max_ms),
            backoff_type: self.backoff.backoff_type,
            rate_limit: self.rate_limit.clone(),
            ..HttpClientConfig::default()
        }
    }
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffSettings {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    200
}

fn default_max_ms() -> u64 {
    30_000
}

// ============================================================================
// Environment Profile
// ============================================================================

/// `SCW_*` environment values, captured once
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvProfile {
    /// `SCW_ACCESS_KEY`
    pub access_key: Option<String>,
    /// `SCW_SECRET_KEY`
    pub secret_key: Option<String>,
    /// `SCW_DEFAULT_REGION`
    pub default_region: Option<String>,
    /// `SCW_DEFAULT_ZONE`
    pub default_zone: Option<String>,
    /// `SCW_DEFAULT_ORGANIZATION_ID`
    pub organization_id: Option<String>,
    /// `SCW_DEFAULT_PROJECT_ID`
    pub project_id: Option<String>,
    /// `SCW_API_URL`
    pub api_url: Option<String>,
}

impl EnvProfile {
    /// Capture the process environment
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a profile from explicit variables; empty values count as unset
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut take = |key: &str| vars.remove(key).none_if_empty();

        Self {
            access_key: take("SCW_ACCESS_KEY"),
            secret_key: take("SCW_SECRET_KEY"),
            default_region: take("SCW_DEFAULT_REGION"),
            default_zone: take("SCW_DEFAULT_ZONE"),
            organization_id: take("SCW_DEFAULT_ORGANIZATION_ID"),
            project_id: take("SCW_DEFAULT_PROJECT_ID"),
            api_url: take("SCW_API_URL"),
        }
    }
}

impl std::fmt::Debug for EnvProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvProfile")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .field("default_region", &self.default_region)
            .field("default_zone", &self.default_zone)
            .field("organization_id", &self.organization_id)
            .field("project_id", &self.project_id)
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_minimal_yaml() {
        let config = ConnectionConfig::from_yaml("regions: [\"fr-*\"]").unwrap();
        assert_eq!(config.region_patterns(), ["fr-*"]);
        assert!(config.zone_patterns().is_empty());
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.http, HttpSettings::default());
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
access_key: SCWXXXXXXXXXXXXXXXXX
secret_key: 11111111-2222-3333-4444-555555555555
organization_id: org-1
regions: ["fr-par", "nl-ams"]
zones: ["*-1"]
api_url: http://localhost:8080
page_size: 50
max_concurrency: 2
http:
  timeout_secs: 5
  max_retries: 1
  backoff:
    type: linear
    initial_ms: 10
    max_ms: 100
  rate_limit: null
"#;
        let config = ConnectionConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.organization_id.as_deref(), Some("org-1"));
        assert_eq!(config.zone_patterns(), ["*-1"]);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.http.backoff.backoff_type, BackoffType::Linear);
        assert!(config.http.rate_limit.is_none());

        let client = config.http.client_config("http://localhost:8080");
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(client.max_retries, 1);
        assert_eq!(client.max_backoff, Duration::from_millis(100));
        assert!(client.rate_limit.is_none());
    }

    #[test]
    fn test_parse_json() {
        let config =
            ConnectionConfig::from_json(r#"{"zones": ["fr-par-1"], "page_size": 10}"#).unwrap();
        assert_eq!(config.zone_patterns(), ["fr-par-1"]);
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = ConnectionConfig::from_yaml("region: fr-par").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_validate_ranges() {
        let err = ConnectionConfig::from_yaml("page_size: 500").unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "page_size"));

        let err = ConnectionConfig::from_yaml("max_concurrency: 0").unwrap_err();
        assert!(err.is_config());

        let err = ConnectionConfig::from_yaml("api_url: not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "api_url"));

        let err = ConnectionConfig::from_yaml("http:\n  backoff:\n    initial_ms: 10\n    max_ms: 1")
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_object_storage_url() {
        assert_eq!(
            ConnectionConfig::default().object_storage_url(),
            "https://s3.{region}.scw.cloud"
        );

        let config =
            ConnectionConfig::from_yaml("object_storage_url: http://localhost:9000/{region}").unwrap();
        assert_eq!(config.object_storage_url(), "http://localhost:9000/{region}");

        let err = ConnectionConfig::from_yaml("object_storage_url: http://localhost:9000").unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "object_storage_url")
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"regions": ["pl-waw"]}"#).unwrap();
        let config = ConnectionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.region_patterns(), ["pl-waw"]);

        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(b"zones: [\"nl-ams-2\"]").unwrap();
        let config = ConnectionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.zone_patterns(), ["nl-ams-2"]);
    }

    #[test]
    fn test_from_missing_file() {
        let err = ConnectionConfig::from_file("/nonexistent/scaleway.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_env_profile_from_vars() {
        let env = EnvProfile::from_vars([
            ("SCW_ACCESS_KEY", "AK"),
            ("SCW_SECRET_KEY", "SK"),
            ("SCW_DEFAULT_REGION", "nl-ams"),
            ("SCW_DEFAULT_ZONE", ""),
            ("UNRELATED", "x"),
        ]);
        assert_eq!(env.access_key.as_deref(), Some("AK"));
        assert_eq!(env.default_region.as_deref(), Some("nl-ams"));
        assert_eq!(env.default_zone, None);
        assert!(!format!("{env:?}").contains("SK"));
    }

    #[test]
    fn test_effective_values_prefer_config() {
        let env = EnvProfile::from_vars([
            ("SCW_API_URL", "http://env"),
            ("SCW_DEFAULT_PROJECT_ID", "p-env"),
        ]);
        let mut config = ConnectionConfig::default();
        assert_eq!(config.api_url(&env), "http://env");
        assert_eq!(config.project_id(&env).as_deref(), Some("p-env"));
        assert_eq!(config.api_url(&EnvProfile::default()), DEFAULT_API_URL);

        config.api_url = Some("http://config".into());
        config.project_id = Some("p-config".into());
        assert_eq!(config.api_url(&env), "http://config");
        assert_eq!(config.project_id(&env).as_deref(), Some("p-config"));
    }
}
