//! # CloudClip
//!
//! Clipboard synchronization agent backed by a shared HTTP store.
//!
//! Each device runs an agent that polls the local clipboard and a single
//! remote JSON resource. Local clipboard changes are uploaded; remote changes
//! that originated on another device are copied into the local clipboard.
//! Consistency across devices is last-writer-wins, keyed by origin device and
//! a per-upload random tie-breaker.

pub mod agent;
pub mod clipboard;
pub mod config;
pub mod control;
pub mod notify;
pub mod remote;
pub mod sync;

pub use config::Config;

/// Result type alias for CloudClip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for CloudClip operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Clipboard operation error
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] clipboard::ClipboardError),

    /// Remote store error
    #[error("Remote store error: {0}")]
    Remote(#[from] remote::RemoteError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wire a sync agent from configuration: system clipboard, remote store
/// client, notifier, decision engine, poll loop.
pub fn build_agent(config: &Config) -> Result<agent::SyncAgent> {
    use std::sync::Arc;

    let clipboard = Arc::new(clipboard::SystemClipboard::new());
    let remote = Arc::new(remote::RemoteStoreClient::new(config)?);
    let notifier = Arc::new(notify::Notifier::new(config.notification_url.clone()));

    let engine = sync::SyncEngine::new(
        sync::SyncState::new(config.device_id.clone()),
        clipboard,
        remote,
        notifier,
    );

    Ok(agent::SyncAgent::new(engine, config.check_interval()))
}
