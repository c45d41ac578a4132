//! Poll loop / scheduler
//!
//! Drives the sync engine on a fixed interval from a dedicated background
//! task. Cancellation is cooperative: clearing the running flag takes effect
//! at the next tick boundary, and a `Notify` wake cuts the interval sleep
//! short so pause and quit do not wait out a full interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::sync::SyncEngine;

/// Grace period for the loop task to finish its current tick on shutdown
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Handle to the background sync loop
///
/// The engine lives in an async mutex so that sync state survives
/// pause/resume cycles while only one loop task can ever tick at a time.
pub struct SyncAgent {
    engine: Arc<Mutex<SyncEngine>>,
    interval: Duration,
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl SyncAgent {
    pub fn new(engine: SyncEngine, interval: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            interval,
            running: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
            task: None,
        }
    }

    /// Whether the loop is actively executing sync ticks
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether a loop task is currently alive
    pub fn loop_alive(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Start the sync loop, spawning a background task if none is alive
    pub fn start(&mut self) {
        self.running.store(true, Ordering::SeqCst);

        if self.loop_alive() {
            return;
        }

        let engine = Arc::clone(&self.engine);
        let running = Arc::clone(&self.running);
        let wake = Arc::clone(&self.wake);
        let interval = self.interval;

        self.task = Some(tokio::spawn(async move {
            info!("Sync loop started (interval {:?})", interval);
            while running.load(Ordering::SeqCst) {
                engine.lock().await.tick().await;

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = wake.notified() => {}
                }
            }
            info!("Sync loop stopped");
        }));
    }

    /// Pause the sync loop; the task exits at the next tick boundary
    pub fn pause(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // notify_one stores a permit, so a pause issued mid-tick still cuts
        // the following interval sleep short
        self.wake.notify_one();
    }

    /// Flip between running and paused; returns the new running state
    pub fn toggle(&mut self) -> bool {
        if self.is_running() {
            self.pause();
            false
        } else {
            self.start();
            true
        }
    }

    /// Stop the loop and wait for it to finish its current tick.
    ///
    /// Waits at most `SHUTDOWN_GRACE`, then abandons the task so shutdown
    /// never hangs on a stuck network call.
    pub async fn shutdown(mut self) {
        self.pause();

        if let Some(task) = self.task.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Sync loop task panicked: {}", e),
                Err(_) => warn!("Sync loop did not stop within {:?}", SHUTDOWN_GRACE),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::testing::MemoryClipboard;
    use crate::notify::Notifier;
    use crate::remote::RemoteStoreClient;
    use crate::sync::SyncState;

    fn offline_engine() -> SyncEngine {
        // Port 1 refuses connections immediately, so remote calls fail soft
        let remote = RemoteStoreClient::with_resource(
            "http://127.0.0.1:1/SyncClipboard.json".to_string(),
            "Device_42".to_string(),
            "alice",
            "secret",
        )
        .unwrap();

        SyncEngine::new(
            SyncState::new("Device_42"),
            Arc::new(MemoryClipboard::new("")),
            Arc::new(remote),
            Arc::new(Notifier::new(None)),
        )
    }

    #[tokio::test]
    async fn test_start_pause_resume() {
        let mut agent = SyncAgent::new(offline_engine(), Duration::from_millis(10));
        assert!(!agent.is_running());
        assert!(!agent.loop_alive());

        agent.start();
        assert!(agent.is_running());
        assert!(agent.loop_alive());

        agent.pause();
        assert!(!agent.is_running());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!agent.loop_alive());

        agent.start();
        assert!(agent.is_running());
        assert!(agent.loop_alive());

        agent.shutdown().await;
    }

    #[tokio::test]
    async fn test_toggle_flips_state() {
        let mut agent = SyncAgent::new(offline_engine(), Duration::from_millis(10));
        assert!(agent.toggle());
        assert!(agent.is_running());
        assert!(!agent.toggle());
        assert!(!agent.is_running());
        agent.shutdown().await;
    }

    #[tokio::test]
    async fn test_start_does_not_spawn_second_loop() {
        let mut agent = SyncAgent::new(offline_engine(), Duration::from_millis(10));
        agent.start();
        agent.start();

        // A single pause must stop everything; a leaked second loop would
        // keep a task alive past the grace sleep
        agent.pause();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!agent.loop_alive());
        agent.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_without_start() {
        let agent = SyncAgent::new(offline_engine(), Duration::from_millis(10));
        agent.shutdown().await;
    }
}
