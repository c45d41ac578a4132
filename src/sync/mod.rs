//! Sync decision engine
//!
//! Owns the per-device sync state and implements the per-tick decision rule:
//! upload on local change, otherwise check the remote store and download
//! content that originated on another device. The rule itself is expressed as
//! pure functions (`plan_tick`, `accepts_remote`) so it can be tested without
//! a network or a clipboard; `SyncEngine::tick` is the thin effectful
//! executor around them.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::clipboard::ClipboardProvider;
use crate::notify::Notifier;
use crate::remote::{ContentKind, RemoteRecord, RemoteStoreClient};

/// Per-device sync state.
///
/// Mutated only inside `SyncEngine::tick`, which runs on the poll loop's
/// single execution context. Never persisted; discarded on exit.
#[derive(Debug, Clone)]
pub struct SyncState {
    /// Last clipboard text this device has seen, whether typed locally or
    /// written from remote. De-duplication key against echo loops.
    pub last_local_content: String,
    /// Validator of the last remote resource fetched
    pub last_remote_etag: Option<String>,
    /// Highest tie-breaker value this device has acted on
    pub last_seen_tie_breaker: i64,
    /// Stable identifier distinguishing our own writes from other devices'
    pub device_id: String,
}

impl SyncState {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            last_local_content: String::new(),
            last_remote_etag: None,
            last_seen_tie_breaker: 0,
            device_id: device_id.into(),
        }
    }
}

/// What a tick should do, given the current local clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPlan {
    /// Local content changed: upload it and end the tick. Local changes
    /// always take priority and suppress the download check, so a just-typed
    /// value is never clobbered by stale remote data in the same tick.
    Upload,
    /// No local change: poll the remote store
    CheckRemote,
}

/// Decide between the upload and download branches for one tick.
pub fn plan_tick(state: &SyncState, local_content: &str) -> TickPlan {
    if local_content != state.last_local_content && !local_content.trim().is_empty() {
        TickPlan::Upload
    } else {
        TickPlan::CheckRemote
    }
}

/// Remote-acceptance predicate: should this record be written to the local
/// clipboard?
///
/// All conditions must hold: the tie-breaker differs from the last one we
/// accepted (equality, not ordering — remote values carry no numeric order
/// guarantee across devices), the record originated on another device, the
/// content actually differs from what is already local, the content is
/// non-empty after trimming, and the record is text.
pub fn accepts_remote(state: &SyncState, record: &RemoteRecord) -> bool {
    record.tie_breaker != state.last_seen_tie_breaker
        && record.origin_device.trim() != state.device_id
        && record.content != state.last_local_content
        && !record.content.trim().is_empty()
        && record.content_type == ContentKind::Text
}

/// Effectful executor for the decision rule
pub struct SyncEngine {
    state: SyncState,
    clipboard: Arc<dyn ClipboardProvider>,
    remote: Arc<RemoteStoreClient>,
    notifier: Arc<Notifier>,
}

impl SyncEngine {
    pub fn new(
        state: SyncState,
        clipboard: Arc<dyn ClipboardProvider>,
        remote: Arc<RemoteStoreClient>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            state,
            clipboard,
            remote,
            notifier,
        }
    }

    /// Current sync state (read-only)
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Execute one sync tick.
    ///
    /// Every failure inside a tick is soft: logged, then the tick ends.
    /// Ticks are independent, so the next one simply retries.
    pub async fn tick(&mut self) {
        let local = match self.clipboard.get_text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read clipboard: {}", e);
                return;
            }
        };

        match plan_tick(&self.state, &local) {
            TickPlan::Upload => self.upload(local).await,
            TickPlan::CheckRemote => self.check_remote().await,
        }
    }

    async fn upload(&mut self, content: String) {
        debug!("Local clipboard changed, uploading");
        self.state.last_local_content = content.clone();

        self.notifier.notify("1").await;

        match self.remote.publish(&content).await {
            Ok(()) => info!("Uploaded {} bytes", content.len()),
            // Soft failure: the next local change re-attempts
            Err(e) => error!("Upload failed: {}", e),
        }
    }

    async fn check_remote(&mut self) {
        let Some(fetched) = self
            .remote
            .fetch_if_changed(self.state.last_remote_etag.as_deref())
            .await
        else {
            return;
        };

        // Cache the validator whenever a fetch happened, accepted or not
        if let Some(etag) = fetched.etag {
            self.state.last_remote_etag = Some(etag);
        }

        let record = fetched.record;
        if !accepts_remote(&self.state, &record) {
            debug!("Remote record not applicable, ignoring");
            return;
        }

        self.state.last_local_content = record.content.clone();
        self.state.last_seen_tie_breaker = record.tie_breaker;

        match self.clipboard.set_text(&record.content).await {
            Ok(()) => info!(
                "Downloaded {} bytes from device {}",
                record.content.len(),
                record.origin_device.trim()
            ),
            Err(e) => warn!("Failed to write clipboard: {}", e),
        }
    }
}
