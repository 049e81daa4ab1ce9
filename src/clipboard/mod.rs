//! Clipboard abstraction layer
//!
//! The monitor only ever needs three things from the operating system: a
//! change counter that moves whenever something writes to the clipboard, the
//! current plain-text content, and a way to put text back. This module
//! provides that interface together with the platform backends.

use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

#[cfg(target_os = "macos")]
pub mod macos;

pub mod safety;

/// Clipboard service consumed by the monitor
#[async_trait]
pub trait ClipboardService: Send + Sync {
    /// Monotonically increasing counter, bumped on every clipboard write
    async fn change_count(&self) -> i64;

    /// Current plain-text content, `None` when there is no text representation
    async fn read_text(&self) -> Result<Option<String>, ClipboardError>;

    /// Replace the clipboard content with `text`
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Get backend name
    fn name(&self) -> &str;
}

/// Clipboard errors
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Platform-specific error
    #[error("Platform error: {0}")]
    Platform(String),

    /// No content available
    #[error("No clipboard content available")]
    NoContent,

    /// Backend state was poisoned by a panicking thread
    #[error("Clipboard backend lock poisoned")]
    Poisoned,
}

impl From<arboard::Error> for ClipboardError {
    fn from(err: arboard::Error) -> Self {
        match err {
            arboard::Error::ContentNotAvailable => ClipboardError::NoContent,
            other => ClipboardError::Platform(other.to_string()),
        }
    }
}

/// Create the clipboard service for the current platform
pub fn create_service() -> Result<Box<dyn ClipboardService>, ClipboardError> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::PasteboardClipboard::new()?))
    }

    #[cfg(not(target_os = "macos"))]
    {
        Ok(Box::new(ArboardClipboard::new()?))
    }
}

/// Change counter synthesised from successive clipboard reads
///
/// The counter moves whenever the md5 digest of the observed text differs
/// from the previous observation. Re-copying the exact text that is already
/// on the clipboard therefore goes unnoticed.
#[cfg(not(target_os = "macos"))]
#[derive(Debug, Default)]
struct DigestCounter {
    last_digest: Option<md5::Digest>,
    counter: i64,
}

#[cfg(not(target_os = "macos"))]
impl DigestCounter {
    /// Feed the latest observed text and return the current counter
    fn advance(&mut self, text: Option<&str>) -> i64 {
        let digest = text.map(md5::compute);
        if digest != self.last_digest {
            self.last_digest = digest;
            self.counter += 1;
        }
        self.counter
    }
}

#[cfg(not(target_os = "macos"))]
struct ArboardState {
    clipboard: arboard::Clipboard,
    changes: DigestCounter,
}

/// Cross-platform backend built on `arboard`
///
/// `arboard` exposes no change counter, so one is derived from content
/// digests (see [`DigestCounter`]). Copying the same text twice in a row is
/// only seen once, so that entry keeps its original id and timestamp.
#[cfg(not(target_os = "macos"))]
pub struct ArboardClipboard {
    state: Mutex<ArboardState>,
}

#[cfg(not(target_os = "macos"))]
impl ArboardClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let clipboard = arboard::Clipboard::new()?;
        Ok(Self {
            state: Mutex::new(ArboardState {
                clipboard,
                changes: DigestCounter::default(),
            }),
        })
    }
}

#[cfg(not(target_os = "macos"))]
#[async_trait]
impl ClipboardService for ArboardClipboard {
    async fn change_count(&self) -> i64 {
        let Ok(mut state) = self.state.lock() else {
            return 0;
        };

        let text = state.clipboard.get_text().ok();
        state.changes.advance(text.as_deref())
    }

    async fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        let mut state = self.state.lock().map_err(|_| ClipboardError::Poisoned)?;
        match state.clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut state = self.state.lock().map_err(|_| ClipboardError::Poisoned)?;
        state.clipboard.set_text(text.to_owned())?;
        Ok(())
    }

    fn name(&self) -> &str {
        "arboard"
    }
}

/// In-process clipboard with a real change counter
///
/// Used for the CLI `--simulate` mode and throughout the test suite.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    inner: Mutex<(i64, Option<String>)>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `text` already on the clipboard at counter `count`
    pub fn with_text(count: i64, text: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new((count, Some(text.into()))),
        }
    }

    /// Simulate another application copying `text`
    pub fn copy(&self, text: impl Into<String>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.0 += 1;
            inner.1 = Some(text.into());
        }
    }

    /// Simulate a copy of something without a text representation
    pub fn copy_non_text(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.0 += 1;
            inner.1 = None;
        }
    }

    /// Current text without going through the async trait
    pub fn current(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|inner| inner.1.clone())
    }
}

#[async_trait]
impl ClipboardService for MemoryClipboard {
    async fn change_count(&self) -> i64 {
        self.inner.lock().map(|inner| inner.0).unwrap_or_default()
    }

    async fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        let inner = self.inner.lock().map_err(|_| ClipboardError::Poisoned)?;
        Ok(inner.1.clone())
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.copy(text);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
