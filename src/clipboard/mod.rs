//! Clipboard abstraction layer
//!
//! A thin async wrapper over the OS clipboard. The sync engine only needs
//! plain text, so the trait is deliberately small; the `arboard` backend
//! covers macOS, Windows, X11 and Wayland.

use async_trait::async_trait;
use thiserror::Error;

/// Clipboard errors
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Platform-specific error
    #[error("Platform error: {0}")]
    Platform(String),

    /// No text content available
    #[error("No clipboard text available")]
    NoContent,

    /// Background task failure
    #[error("Clipboard task failed: {0}")]
    Task(String),
}

/// Clipboard provider trait
#[async_trait]
pub trait ClipboardProvider: Send + Sync {
    /// Get current clipboard text. An empty clipboard reads as an empty
    /// string rather than an error.
    async fn get_text(&self) -> Result<String, ClipboardError>;

    /// Set clipboard text
    async fn set_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Get provider name
    fn name(&self) -> &str;
}

/// System clipboard backed by `arboard`
///
/// `arboard::Clipboard` is not `Sync`, so a fresh handle is opened per call
/// inside `spawn_blocking`. Cheap enough at a 2 s poll interval.
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipboardProvider for SystemClipboard {
    async fn get_text(&self) -> Result<String, ClipboardError> {
        tokio::task::spawn_blocking(|| {
            let mut cb = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Platform(e.to_string()))?;
            match cb.get_text() {
                Ok(text) => Ok(text),
                // An empty or non-text clipboard is not an error for sync
                Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
                Err(e) => Err(ClipboardError::Platform(e.to_string())),
            }
        })
        .await
        .map_err(|e| ClipboardError::Task(e.to_string()))?
    }

    async fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut cb = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Platform(e.to_string()))?;
            cb.set_text(text)
                .map_err(|e| ClipboardError::Platform(e.to_string()))
        })
        .await
        .map_err(|e| ClipboardError::Task(e.to_string()))?
    }

    fn name(&self) -> &str {
        "arboard"
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory clipboard for engine tests.

    use super::*;
    use std::sync::Mutex;

    /// Fake clipboard holding its text in memory
    pub struct MemoryClipboard {
        text: Mutex<String>,
        /// Number of writes performed, for idempotence assertions
        pub writes: Mutex<usize>,
        /// When true, every access fails
        pub poisoned: Mutex<bool>,
    }

    impl MemoryClipboard {
        pub fn new(initial: &str) -> Self {
            Self {
                text: Mutex::new(initial.to_string()),
                writes: Mutex::new(0),
                poisoned: Mutex::new(false),
            }
        }

        pub fn set_local(&self, text: &str) {
            *self.text.lock().unwrap() = text.to_string();
        }

        pub fn current(&self) -> String {
            self.text.lock().unwrap().clone()
        }

        pub fn write_count(&self) -> usize {
            *self.writes.lock().unwrap()
        }
    }

    #[async_trait]
    impl ClipboardProvider for MemoryClipboard {
        async fn get_text(&self) -> Result<String, ClipboardError> {
            if *self.poisoned.lock().unwrap() {
                return Err(ClipboardError::Platform("poisoned".to_string()));
            }
            Ok(self.text.lock().unwrap().clone())
        }

        async fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
            if *self.poisoned.lock().unwrap() {
                return Err(ClipboardError::Platform("poisoned".to_string()));
            }
            *self.text.lock().unwrap() = text.to_string();
            *self.writes.lock().unwrap() += 1;
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryClipboard;
    use super::*;

    #[tokio::test]
    async fn test_memory_clipboard_round_trip() {
        let cb = MemoryClipboard::new("hello");
        assert_eq!(cb.get_text().await.unwrap(), "hello");

        cb.set_text("world").await.unwrap();
        assert_eq!(cb.get_text().await.unwrap(), "world");
        assert_eq!(cb.write_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_clipboard_poisoned() {
        let cb = MemoryClipboard::new("hello");
        *cb.poisoned.lock().unwrap() = true;
        assert!(cb.get_text().await.is_err());
        assert!(cb.set_text("x").await.is_err());
    }
}
