//! # EdgeBoard
//!
//! Clipboard history engine behind the EdgeBoard desktop overlay.
//!
//! The pieces fit together as a pipeline: [`monitor::ClipboardMonitor`]
//! notices a clipboard change, [`history::classify`] tags the text,
//! [`history::HistoryStore`] records it, [`history::preview`] renders the
//! entries and a [`sink::UpdateSink`] receives the formatted snapshot.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod history;
pub mod monitor;
pub mod sink;

pub use config::Config;

/// Result type alias for EdgeBoard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for EdgeBoard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Clipboard operation error
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] clipboard::ClipboardError),

    /// History error
    #[error("History error: {0}")]
    History(#[from] history::HistoryError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
