//! Presentation boundary
//!
//! The overlay only ever sees [`HistoryItemView`] batches pushed through an
//! [`UpdateSink`]. Whether a batch is pushed at all depends on the shared
//! [`Visibility`] flag.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::PreviewConfig;
use crate::history::{preview, ClipboardEntry, ContentKind, EntryId, HistoryStore};

/// Display-ready form of a history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItemView {
    pub id: EntryId,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub time_ago: String,
    pub size: String,
    pub preview: String,
}

impl HistoryItemView {
    pub fn from_entry(
        entry: &ClipboardEntry,
        preview_config: &PreviewConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: entry.id,
            content: entry.content.clone(),
            kind: entry.kind,
            time_ago: format_relative(entry.created_at, now),
            size: format_size(entry.byte_size),
            preview: preview(entry, preview_config),
        }
    }
}

/// Receiver of formatted history snapshots
#[cfg_attr(test, mockall::automock)]
pub trait UpdateSink: Send + Sync {
    /// Replace whatever the presentation layer shows with `items`
    fn publish(&self, items: &[HistoryItemView]);
}

/// Whether the overlay is currently on screen
#[derive(Debug, Clone, Default)]
pub struct Visibility(Arc<AtomicBool>);

impl Visibility {
    pub fn new(visible: bool) -> Self {
        Self(Arc::new(AtomicBool::new(visible)))
    }

    pub fn is_visible(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, visible: bool) {
        self.0.store(visible, Ordering::SeqCst);
    }

    /// Flip the flag and return the new state
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::SeqCst)
    }
}

/// Formats the head of the history and hands it to the sink
#[derive(Clone)]
pub struct Publisher {
    sink: Arc<dyn UpdateSink>,
    visibility: Visibility,
    limit: usize,
    preview: PreviewConfig,
}

impl Publisher {
    pub fn new(
        sink: Arc<dyn UpdateSink>,
        visibility: Visibility,
        limit: usize,
        preview: PreviewConfig,
    ) -> Self {
        Self {
            sink,
            visibility,
            limit,
            preview,
        }
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    /// Build the views for the first `limit` entries of `store`
    pub fn views(&self, store: &HistoryStore, now: DateTime<Utc>) -> Vec<HistoryItemView> {
        store
            .snapshot(self.limit)
            .iter()
            .map(|entry| HistoryItemView::from_entry(entry, &self.preview, now))
            .collect()
    }

    /// Push the current history if the overlay is visible
    ///
    /// Returns whether the sink was called.
    pub fn publish(&self, store: &HistoryStore) -> bool {
        if !self.visibility.is_visible() {
            debug!("Overlay hidden, skipping publish");
            return false;
        }

        let items = self.views(store, Utc::now());
        self.sink.publish(&items);
        true
    }
}

/// Human-readable age of `created_at` relative to `now`
pub fn format_relative(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - created_at).num_seconds();

    let (value, unit) = match seconds {
        s if s < 1 => return "now".to_string(),
        s if s < 60 => (s, "second"),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s => (s / 86_400, "day"),
    };

    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}

pub fn format_size(bytes: usize) -> String {
    format!("{} bytes", bytes)
}

/// Writes each snapshot as one JSON array per line
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> Option<W> {
        self.writer.into_inner().ok()
    }
}

impl<W: Write + Send> UpdateSink for JsonLinesSink<W> {
    fn publish(&self, items: &[HistoryItemView]) {
        let Ok(mut writer) = self.writer.lock() else {
            warn!("Sink writer lock poisoned, dropping update");
            return;
        };

        if let Err(e) = write_line(&mut *writer, items) {
            warn!("Failed to write history update: {}", e);
        }
    }
}

fn write_line<W: Write>(writer: &mut W, items: &[HistoryItemView]) -> std::io::Result<()> {
    serde_json::to_writer(&mut *writer, items)?;
    writeln!(writer)?;
    writer.flush()
}

/// Forwards snapshots over a tokio channel
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Vec<HistoryItemView>>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Vec<HistoryItemView>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl UpdateSink for ChannelSink {
    fn publish(&self, items: &[HistoryItemView]) {
        if self.sender.send(items.to_vec()).is_err() {
            debug!("Update receiver dropped");
        }
    }
}
