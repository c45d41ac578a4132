//! Remote store client
//!
//! Talks to a single shared JSON resource over HTTP: a lightweight HEAD probe
//! for the ETag validator, a conditional GET that skips the body when the
//! validator is unchanged, and a PUT to publish local clipboard content.
//!
//! The client never mutates sync state; it returns data for the decision
//! engine to act on. The underlying `reqwest` client carries the basic-auth
//! credentials in its default headers and is immutable after construction.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, ETAG};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// Default timeout for every remote call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Remote store errors
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Request exceeded the bounded timeout
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("unexpected status: {0}")]
    UnexpectedStatus(StatusCode),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RemoteError::Timeout
        } else if let Some(status) = error.status() {
            RemoteError::UnexpectedStatus(status)
        } else {
            RemoteError::Network(error.to_string())
        }
    }
}

/// Content type of a remote record; only text participates in sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Other,
}

impl ContentKind {
    fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("text") {
            ContentKind::Text
        } else {
            ContentKind::Other
        }
    }
}

/// One parsed remote clipboard record, constructed per fetch
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRecord {
    pub content: String,
    pub content_type: ContentKind,
    pub origin_device: String,
    pub tie_breaker: i64,
}

/// A fetched record together with the validator it was served under
#[derive(Debug, Clone)]
pub struct FetchedRecord {
    pub record: RemoteRecord,
    pub etag: Option<String>,
}

/// Client for the shared remote clipboard resource
pub struct RemoteStoreClient {
    client: reqwest::Client,
    resource_url: String,
    device_id: String,
}

impl RemoteStoreClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> Result<Self, RemoteError> {
        Self::with_resource(
            config.remote_resource_url(),
            config.device_id.clone(),
            &config.username,
            &config.password,
        )
    }

    /// Build a client against an explicit resource URL
    pub fn with_resource(
        resource_url: String,
        device_id: String,
        username: &str,
        password: &str,
    ) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        let credentials = {
            use base64::engine::general_purpose::STANDARD;
            use base64::Engine as _;
            STANDARD.encode(format!("{}:{}", username, password))
        };
        let mut auth = HeaderValue::from_str(&format!("Basic {}", credentials))
            .map_err(|e| RemoteError::Build(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| RemoteError::Build(e.to_string()))?;

        Ok(Self {
            client,
            resource_url,
            device_id,
        })
    }

    /// Issue a metadata-only request for the server's current validator.
    ///
    /// Returns `None` on any transport error or when the server sends no
    /// ETag; both read as "nothing to skip on".
    pub async fn probe_freshness(&self) -> Option<String> {
        match self.head_etag().await {
            Ok(etag) => etag,
            Err(e) => {
                debug!("Freshness probe failed: {}", e);
                None
            }
        }
    }

    async fn head_etag(&self) -> Result<Option<String>, RemoteError> {
        let response = self.client.head(&self.resource_url).send().await?;
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        Ok(etag)
    }

    /// Fetch the remote record unless the validator still matches `last_etag`.
    ///
    /// Returns `None` when there is nothing new: validator unchanged,
    /// transport failure, non-success status, or a malformed payload. A
    /// malformed payload is logged and swallowed; the next tick retries.
    pub async fn fetch_if_changed(&self, last_etag: Option<&str>) -> Option<FetchedRecord> {
        let server_etag = match self.head_etag().await {
            Ok(etag) => etag,
            Err(e) => {
                warn!("Remote probe failed: {}", e);
                return None;
            }
        };

        if server_etag.is_some() && server_etag.as_deref() == last_etag {
            debug!("ETag unchanged, skipping download");
            return None;
        }

        let response = match self.client.get(&self.resource_url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Remote fetch failed: {}", RemoteError::from(e));
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Remote fetch returned status {}", response.status());
            return None;
        }

        let value: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("Malformed remote payload: {}", e);
                return None;
            }
        };

        let record = match parse_record(&value) {
            Some(record) => record,
            None => {
                warn!("Remote payload is not a clipboard record: {}", value);
                return None;
            }
        };

        Some(FetchedRecord {
            record,
            etag: server_etag,
        })
    }

    /// Publish local clipboard content to the shared resource.
    ///
    /// Serializes the record with a fresh random tie-breaker. Any non-2xx
    /// outcome is an error for the caller to log; there is no in-call retry
    /// because the next tick naturally re-attempts.
    pub async fn publish(&self, content: &str) -> Result<(), RemoteError> {
        let tie_breaker: i64 = rand::rng().random_range(0..10000);
        let body = serde_json::json!({
            "Clipboard": content,
            "Type": "Text",
            "Device": self.device_id,
            "Random_number": tie_breaker.to_string(),
        });

        let response = self
            .client
            .put(&self.resource_url)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            debug!("Published {} bytes (tie-breaker {})", content.len(), tie_breaker);
            Ok(())
        } else {
            Err(RemoteError::UnexpectedStatus(response.status()))
        }
    }
}

/// Normalize a raw JSON document into a strict record.
///
/// The store is written by heterogeneous clients with inconsistent key
/// casing, so accepted aliases are enumerated explicitly: `" Device"` for
/// `"Device"` and `"type"` for `"Type"`. `Random_number` may arrive as a
/// string or a number; anything unparseable counts as 0. Missing fields
/// default to empty and fail the acceptance predicate downstream.
pub fn parse_record(value: &Value) -> Option<RemoteRecord> {
    let map = value.as_object()?;

    let str_field = |keys: &[&str]| -> String {
        keys.iter()
            .filter_map(|k| map.get(*k))
            .filter_map(|v| v.as_str())
            .find(|s| !s.is_empty())
            .unwrap_or("")
            .to_string()
    };

    let content = str_field(&["Clipboard"]);
    let origin_device = str_field(&["Device", " Device"]);
    let type_label = str_field(&["Type", "type"]);

    let tie_breaker = match map.get("Random_number") {
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        _ => 0,
    };

    Some(RemoteRecord {
        content,
        content_type: ContentKind::from_label(&type_label),
        origin_device,
        tie_breaker,
    })
}
