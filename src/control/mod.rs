//! Control surface
//!
//! The user-facing boundary around the poll loop: toggle sync, report a
//! status label, open the config file location, quit. A tray or any other
//! shell can sit on top of this without knowing about the loop internals.

use std::path::PathBuf;

use tracing::{error, info};

use crate::agent::SyncAgent;

/// Thin shell over the sync agent's running flag
pub struct ControlSurface {
    agent: SyncAgent,
    config_path: PathBuf,
}

impl ControlSurface {
    pub fn new(agent: SyncAgent, config_path: PathBuf) -> Self {
        Self { agent, config_path }
    }

    /// Toggle sync on or off; returns the new running state
    pub fn toggle_sync(&mut self) -> bool {
        let running = self.agent.toggle();
        if running {
            info!("Sync resumed");
        } else {
            info!("Sync paused");
        }
        running
    }

    /// Status label reflecting the running flag
    pub fn status_label(&self) -> &'static str {
        if self.agent.is_running() {
            "Syncing"
        } else {
            "Paused"
        }
    }

    /// Path of the config file this agent was started with
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Open the config file with the platform's default opener
    pub fn open_config(&self) {
        if !self.config_path.exists() {
            error!("Config file does not exist: {}", self.config_path.display());
            return;
        }

        let result = open_with_platform_opener(&self.config_path);
        match result {
            Ok(()) => info!("Opened config file: {}", self.config_path.display()),
            Err(e) => error!("Failed to open config file: {}", e),
        }
    }

    /// Stop the poll loop (bounded grace) and consume the surface
    pub async fn quit(self) {
        info!("Shutting down");
        self.agent.shutdown().await;
    }
}

fn open_with_platform_opener(path: &std::path::Path) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(target_os = "windows")]
    let opener = "explorer";
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let opener = "xdg-open";

    std::process::Command::new(opener).arg(path).spawn()?;
    Ok(())
}
