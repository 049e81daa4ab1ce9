//! Clipboard polling loop
//!
//! [`ClipboardMonitor`] compares the clipboard change counter on a fixed
//! cadence, classifies new text, records it in the shared history and pushes
//! a fresh snapshot to the overlay. [`HistoryController`] exposes the user
//! actions the overlay can trigger while the monitor runs.

use std::sync::Arc;

use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::clipboard::safety::is_potentially_sensitive;
use crate::clipboard::ClipboardService;
use crate::config::PollerConfig;
use crate::history::{classify, ContentKind, EntryId, HistoryError, HistoryStore};
use crate::sink::Publisher;
use crate::{Error, Result};

/// What a single poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Counter unchanged, or the clipboard could not be read
    Unchanged,
    /// Counter moved but there was no text to record
    Ignored,
    /// Text looked sensitive and was left out of the history
    Skipped,
    /// New entry recorded at the head of the history
    Inserted(EntryId),
}

/// Polls the clipboard and feeds the history
pub struct ClipboardMonitor {
    clipboard: Arc<dyn ClipboardService>,
    history: Arc<RwLock<HistoryStore>>,
    publisher: Publisher,
    config: PollerConfig,
    last_change_count: Option<i64>,
}

impl ClipboardMonitor {
    pub fn new(
        clipboard: Arc<dyn ClipboardService>,
        history: Arc<RwLock<HistoryStore>>,
        publisher: Publisher,
        config: PollerConfig,
    ) -> Self {
        Self {
            clipboard,
            history,
            publisher,
            config,
            last_change_count: None,
        }
    }

    /// Handle for user-triggered actions that shares this monitor's state
    pub fn controller(&self) -> HistoryController {
        HistoryController {
            clipboard: Arc::clone(&self.clipboard),
            history: Arc::clone(&self.history),
            publisher: self.publisher.clone(),
        }
    }

    /// Record whatever is on the clipboard at startup
    ///
    /// The content is stored as [`ContentKind::Text`] unless
    /// `classify_bootstrap` is enabled.
    pub async fn bootstrap(&mut self) -> Option<EntryId> {
        let count = self.clipboard.change_count().await;
        self.last_change_count = Some(count);

        let text = match self.clipboard.read_text().await {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => return None,
            Err(e) => {
                debug!("Startup clipboard read failed: {}", e);
                return None;
            }
        };

        if self.config.skip_sensitive && is_potentially_sensitive(&text) {
            debug!("Skipping potentially sensitive startup content");
            return None;
        }

        let kind = if self.config.classify_bootstrap {
            classify(&text)
        } else {
            ContentKind::Text
        };

        let id = self.record(text, kind).await;
        info!(change_count = count, "Recorded startup clipboard content");
        id
    }

    /// Poll the clipboard once
    pub async fn tick(&mut self) -> TickOutcome {
        let count = self.clipboard.change_count().await;
        if self.last_change_count == Some(count) {
            return TickOutcome::Unchanged;
        }

        let text = match self.clipboard.read_text().await {
            Ok(text) => text,
            Err(e) => {
                debug!("Clipboard read failed, treating as unchanged: {}", e);
                return TickOutcome::Unchanged;
            }
        };
        self.last_change_count = Some(count);

        let Some(text) = text.filter(|t| !t.is_empty()) else {
            debug!(change_count = count, "Clipboard changed without text content");
            return TickOutcome::Ignored;
        };

        if self.config.skip_sensitive && is_potentially_sensitive(&text) {
            debug!("Skipping potentially sensitive clipboard content");
            return TickOutcome::Skipped;
        }

        let kind = classify(&text);
        match self.record(text, kind).await {
            Some(id) => {
                debug!(change_count = count, %kind, %id, "Clipboard content recorded");
                TickOutcome::Inserted(id)
            }
            None => TickOutcome::Ignored,
        }
    }

    async fn record(&self, text: String, kind: ContentKind) -> Option<EntryId> {
        let mut history = self.history.write().await;
        let id = history.insert(text, kind)?;
        self.publisher.publish(&history);
        Some(id)
    }

    /// Run [`bootstrap`](Self::bootstrap) and then poll until shut down
    pub fn spawn(mut self) -> MonitorHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            info!(
                backend = self.clipboard.name(),
                interval_ms = self.config.interval_ms,
                "Starting clipboard monitor"
            );
            self.bootstrap().await;

            let mut ticker = interval(self.config.interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!("Clipboard monitor stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.tick().await;
                    }
                }
            }
        });

        MonitorHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

/// Running monitor task
///
/// Dropping the handle also stops the task at its next poll.
pub struct MonitorHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stop polling and wait for the task to exit
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        (&mut self.task)
            .await
            .map_err(|e| Error::Other(format!("Clipboard monitor task failed: {}", e)))
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            if tx.send(()).is_err() {
                warn!("Clipboard monitor already stopped");
            }
        }
    }
}

/// User actions on the shared history
#[derive(Clone)]
pub struct HistoryController {
    clipboard: Arc<dyn ClipboardService>,
    history: Arc<RwLock<HistoryStore>>,
    publisher: Publisher,
}

impl HistoryController {
    /// Put the content of history entry `id` back on the clipboard
    ///
    /// The monitor then sees the write as a regular change and moves the
    /// entry to the head.
    pub async fn copy_entry(&self, id: EntryId) -> Result<()> {
        let content = {
            let history = self.history.read().await;
            history
                .find(id)
                .map(|entry| entry.content.clone())
                .ok_or(HistoryError::NotFound(id))?
        };

        self.clipboard.write_text(&content).await?;
        debug!(%id, "Copied history entry to clipboard");
        Ok(())
    }

    /// Drop every entry and refresh the overlay
    pub async fn clear_history(&self) {
        let mut history = self.history.write().await;
        history.clear();
        self.publisher.publish(&history);
        info!("Clipboard history cleared");
    }

    /// Show the overlay and push the current history to it
    pub async fn show(&self) {
        self.publisher.visibility().set(true);
        self.publisher.publish(&*self.history.read().await);
    }

    pub fn hide(&self) {
        self.publisher.visibility().set(false);
    }

    /// Toggle the overlay, publishing when it becomes visible
    pub async fn toggle(&self) -> bool {
        let visible = self.publisher.visibility().toggle();
        if visible {
            self.publisher.publish(&*self.history.read().await);
        }
        visible
    }

    pub fn history(&self) -> Arc<RwLock<HistoryStore>> {
        Arc::clone(&self.history)
    }
}
