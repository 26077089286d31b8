//! Object storage endpoints
//!
//! Every region serves an S3-compatible endpoint (`https://s3.{region}.scw.cloud`).
//! Requests to it are signed with AWS signature V4 using the connection's
//! access and secret keys; `X-Auth-Token` is never sent there. Answers are
//! XML and are converted to JSON items before row mapping.

use super::xml::{items_at, xml_to_json};
use crate::auth::Credentials;
use crate::config::HttpSettings;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::tables::lookup;
use crate::template;
use crate::types::{JsonValue, StringMap};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;
use url::Url;

/// Object storage endpoint template used when nothing else is configured
pub const DEFAULT_OBJECT_STORAGE_URL: &str = "https://s3.{region}.scw.cloud";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNING_SERVICE: &str = "s3";
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// Signing
// ============================================================================

/// Signs bodyless GET requests with AWS signature V4
#[derive(Clone)]
pub struct SigV4Signer {
    access_key: String,
    secret_key: String,
}

impl fmt::Debug for SigV4Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigV4Signer")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

impl SigV4Signer {
    /// Signer for a key pair
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            access_key: credentials.access_key.clone(),
            secret_key: credentials.secret_key.clone(),
        }
    }

    /// Headers authenticating a GET of `url` at time `now`
    pub fn sign(&self, url: &Url, region: &str, now: DateTime<Utc>) -> Result<Vec<(String, String)>> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let payload_hash = hex::encode(Sha256::digest(b""));

        let canonical_request = format!(
            "GET\n{path}\n{query}\nhost:{host}\nx-amz-content-sha256:{payload_hash}\nx-amz-date:{amz_date}\n\n{SIGNED_HEADERS}\n{payload_hash}",
            path = url.path(),
            query = url.query().unwrap_or_default(),
            host = host_header(url)?,
        );
        let scope = format!("{date}/{region}/{SIGNING_SERVICE}/aws4_request");
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let mut key = format!("AWS4{}", self.secret_key).into_bytes();
        for part in [date.as_str(), region, SIGNING_SERVICE, "aws4_request"] {
            key = hmac(&key, part.as_bytes())?;
        }
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        Ok(vec![
            ("x-amz-date".to_string(), amz_date),
            ("x-amz-content-sha256".to_string(), payload_hash),
            (
                "Authorization".to_string(),
                format!(
                    "{ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
                    self.access_key
                ),
            ),
        ])
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| Error::config(format!("Invalid signing key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// `Host` header value as the HTTP client sends it
fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::config(format!("URL has no host: {url}")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Sorted, percent-encoded query string; it is both sent and signed
fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn uri_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// ============================================================================
// Client
// ============================================================================

/// Lists resources from the object storage endpoint of a region
#[derive(Debug)]
pub struct ObjectStorage {
    http: HttpClient,
    url_template: String,
    signer: SigV4Signer,
}

impl ObjectStorage {
    /// Build a client; `url_template` holds a `{region}` placeholder
    pub fn new(
        url_template: impl Into<String>,
        settings: &HttpSettings,
        credentials: &Credentials,
    ) -> Result<Self> {
        let mut config = settings.client_config("");
        config.base_url = None;

        Ok(Self {
            http: HttpClient::with_config(config)?,
            url_template: url_template.into(),
            signer: SigV4Signer::new(credentials),
        })
    }

    /// Use another endpoint template
    #[must_use]
    pub fn with_url_template(mut self, url_template: impl Into<String>) -> Self {
        self.url_template = url_template.into();
        self
    }

    /// Absolute URL of `path` on a region's endpoint
    pub fn url(&self, region: &str, path: &str, query: &[(String, String)]) -> Result<Url> {
        let vars: StringMap = [("region".to_string(), region.to_string())].into();
        let base = template::render(&self.url_template, &vars)?;
        let mut url = Url::parse(&format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))?;
        if !query.is_empty() {
            url.set_query(Some(&canonical_query(query)));
        }
        Ok(url)
    }

    /// All items under `items_key` of one region's listing
    ///
    /// The listing names its owner once as `<key id>:<project id>`; every
    /// item gets the project part as `Project`.
    pub async fn list(
        &self,
        region: &str,
        path: &str,
        query: &[(String, String)],
        items_key: &str,
    ) -> Result<Vec<JsonValue>> {
        let url = self.url(region, path, query)?;
        let config = self
            .signer
            .sign(&url, region, Utc::now())?
            .into_iter()
            .fold(RequestConfig::new(), |config, (name, value)| {
                config.header(name, value)
            });

        let response = self.http.get(url.as_str(), config).await?;
        let body = response.text().await?;
        let doc = xml_to_json(&body)?;
        let mut items = items_at(&doc, items_key);

        if let Some(project) = owner_project(&doc) {
            for item in &mut items {
                if let JsonValue::Object(fields) = item {
                    fields
                        .entry("Project")
                        .or_insert_with(|| JsonValue::String(project.to_string()));
                }
            }
        }

        debug!(region = %region, url = %url, items = items.len(), "Listed object storage");
        Ok(items)
    }
}

fn owner_project(doc: &JsonValue) -> Option<&str> {
    lookup(doc, "Owner.ID")
        .and_then(JsonValue::as_str)
        .and_then(|id| id.split_once(':'))
        .map(|(_, project)| project)
}
