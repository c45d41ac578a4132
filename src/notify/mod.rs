//! Best-effort push notifications
//!
//! Fire-and-forget POST to an optional notification endpoint when local
//! clipboard content changes. Failure here must never block or abort a sync
//! tick, so every outcome short of success is logged and dropped.

use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Attempts per notification (one retry, no backoff)
const MAX_ATTEMPTS: u32 = 2;

/// Notification title shown on the receiving device
const TITLE: &str = "Cloud Clipboard";

/// Push notifier for local clipboard changes
pub struct Notifier {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl Notifier {
    /// Create a notifier for the given endpoint, if any.
    ///
    /// An endpoint without an http/https scheme is rejected up front with a
    /// warning and behaves like no endpoint at all.
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let endpoint = match endpoint {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                Some(url.trim_end_matches('/').to_string())
            }
            Some(url) => {
                warn!("Notification URL must start with http:// or https://, ignoring: {}", url);
                None
            }
            None => None,
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self { client, endpoint }
    }

    /// Whether a usable endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Send a notification, best effort.
    ///
    /// Tries at most twice with no delay between attempts. Exhausting the
    /// retries logs an error and returns normally.
    pub async fn notify(&self, body: &str) {
        let Some(endpoint) = &self.endpoint else {
            return;
        };

        let payload = serde_json::json!({
            "body": body,
            "title": TITLE,
            "badge": 1,
            "sound": "minuet",
            "group": "Clip",
        });

        for attempt in 1..=MAX_ATTEMPTS {
            match self.client.post(endpoint).json(&payload).send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    debug!("Notification sent");
                    return;
                }
                Ok(response) => {
                    warn!(
                        "Notification attempt {} returned status {}",
                        attempt,
                        response.status()
                    );
                }
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!("Notification attempt {} failed, retrying: {}", attempt, e);
                }
                Err(e) => {
                    error!("Notification failed after {} attempts: {}", MAX_ATTEMPTS, e);
                }
            }
        }
    }
}
