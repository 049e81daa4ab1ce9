//! In-memory clipboard history
//!
//! [`HistoryStore`] owns every captured entry. It keeps them most recent
//! first, never holds two entries with the same content and never grows past
//! its capacity.

pub mod classify;
pub mod preview;

use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use classify::classify;
pub use preview::preview;

use crate::config::MAX_HISTORY;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// IO error while exporting
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Entry id not present in history
    #[error("Entry not found: {0}")]
    NotFound(EntryId),
}

/// Unique identifier of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification tag for clipboard content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentKind {
    Text,
    Url,
    Code,
    Path,
    Document,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Text,
        ContentKind::Url,
        ContentKind::Code,
        ContentKind::Path,
        ContentKind::Document,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "TEXT",
            ContentKind::Url => "URL",
            ContentKind::Code => "CODE",
            ContentKind::Path => "PATH",
            ContentKind::Document => "DOCUMENT",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded clipboard capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    /// Unique identifier, never reused
    pub id: EntryId,
    /// Captured text
    pub content: String,
    /// Kind assigned at classification time
    pub kind: ContentKind,
    /// When the content was captured
    pub created_at: DateTime<Utc>,
    /// Size of `content` in UTF-8 bytes
    pub byte_size: usize,
}

impl ClipboardEntry {
    /// Create a fresh entry stamped with the current time
    pub fn new(content: impl Into<String>, kind: ContentKind) -> Self {
        let content = content.into();
        Self {
            id: EntryId::new(),
            byte_size: content.len(),
            content,
            kind,
            created_at: Utc::now(),
        }
    }
}

/// Summary of the current history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_items: usize,
    pub text_items: usize,
    pub url_items: usize,
    pub code_items: usize,
    pub path_items: usize,
    pub document_items: usize,
    pub total_bytes: usize,
    pub oldest_item: Option<DateTime<Utc>>,
    pub newest_item: Option<DateTime<Utc>>,
}

/// Bounded, deduplicating, most-recent-first clipboard history
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<ClipboardEntry>,
    max_history: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl HistoryStore {
    /// Create a store holding at most `max_history` entries (minimum 1)
    pub fn new(max_history: usize) -> Self {
        let max_history = max_history.max(1);
        Self {
            entries: VecDeque::with_capacity(max_history + 1),
            max_history,
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_history
    }

    /// Record `content` at the head of the history
    ///
    /// Any older entry with identical content is dropped first, and the tail
    /// is trimmed back to capacity. Empty content is ignored and yields `None`.
    pub fn insert(&mut self, content: impl Into<String>, kind: ContentKind) -> Option<EntryId> {
        let content = content.into();
        if content.is_empty() {
            return None;
        }

        self.entries.retain(|entry| entry.content != content);

        let entry = ClipboardEntry::new(content, kind);
        let id = entry.id;
        self.entries.push_front(entry);
        self.entries.truncate(self.max_history);

        debug_assert!(
            self.entries.len() <= self.max_history,
            "history exceeded capacity: {} > {}",
            self.entries.len(),
            self.max_history
        );

        Some(id)
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copy of the first `limit` entries in display order
    pub fn snapshot(&self, limit: usize) -> Vec<ClipboardEntry> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, 0 being the most recent
    pub fn get(&self, index: usize) -> Option<&ClipboardEntry> {
        self.entries.get(index)
    }

    pub fn find(&self, id: EntryId) -> Option<&ClipboardEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Case-insensitive substring search, in display order
    pub fn search(&self, query: &str) -> Vec<ClipboardEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.content.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    pub fn filter_by_kind(&self, kind: ContentKind) -> Vec<ClipboardEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> HistoryStats {
        let mut stats = HistoryStats {
            total_items: self.entries.len(),
            ..HistoryStats::default()
        };

        for entry in &self.entries {
            stats.total_bytes += entry.byte_size;
            match entry.kind {
                ContentKind::Text => stats.text_items += 1,
                ContentKind::Url => stats.url_items += 1,
                ContentKind::Code => stats.code_items += 1,
                ContentKind::Path => stats.path_items += 1,
                ContentKind::Document => stats.document_items += 1,
            }
        }

        stats.oldest_item = self.entries.iter().map(|e| e.created_at).min();
        stats.newest_item = self.entries.iter().map(|e| e.created_at).max();
        stats
    }

    /// Write the whole history as a JSON array, most recent first
    pub fn export_json<W: Write>(&self, writer: W) -> Result<(), HistoryError> {
        let entries: Vec<&ClipboardEntry> = self.entries.iter().collect();
        serde_json::to_writer_pretty(writer, &entries)?;
        Ok(())
    }

    /// Export the history to a JSON file at `path`
    pub fn export_to_path(&self, path: &Path) -> Result<(), HistoryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.export_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contents(entries: &[ClipboardEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.content.as_str()).collect()
    }

    #[test]
    fn test_insert_orders_most_recent_first() {
        let mut store = HistoryStore::default();
        store.insert("a", ContentKind::Text);
        store.insert("b", ContentKind::Text);
        store.insert("c", ContentKind::Text);

        assert_eq!(contents(&store.snapshot(3)), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_reinsert_moves_to_head_with_fresh_id() {
        let mut store = HistoryStore::default();
        let first = store.insert("x", ContentKind::Text).unwrap();
        store.insert("y", ContentKind::Text);
        let second = store.insert("x", ContentKind::Text).unwrap();

        assert_eq!(store.count(), 2);
        assert_eq!(contents(&store.snapshot(10)), vec!["x", "y"]);
        assert_ne!(first, second);
        assert!(store.find(first).is_none());
        assert_eq!(store.get(0).unwrap().id, second);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut store = HistoryStore::default();
        for i in 0..60 {
            store.insert(format!("item {}", i), ContentKind::Text);
        }

        assert_eq!(store.count(), 50);
        let snapshot = store.snapshot(50);
        assert_eq!(snapshot[0].content, "item 59");
        assert_eq!(snapshot[49].content, "item 10");
        assert!(store.search("item 9").is_empty());
        assert!(store.search("item 0").is_empty());
    }

    #[test]
    fn test_empty_content_ignored() {
        let mut store = HistoryStore::default();
        assert_eq!(store.insert("", ContentKind::Text), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_byte_size_is_utf8_length() {
        let mut store = HistoryStore::default();
        store.insert("héllo", ContentKind::Text);
        assert_eq!(store.get(0).unwrap().byte_size, 6);
    }

    #[test]
    fn test_clear() {
        let mut store = HistoryStore::default();
        store.insert("a", ContentKind::Text);
        store.insert("b", ContentKind::Text);
        store.insert("c", ContentKind::Text);

        store.clear();
        assert_eq!(store.count(), 0);
        assert!(store.snapshot(10).is_empty());

        store.clear();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut store = HistoryStore::default();
        store.insert("original", ContentKind::Text);

        let mut snapshot = store.snapshot(1);
        snapshot[0].content.push_str(" changed");
        snapshot.clear();

        assert_eq!(store.get(0).unwrap().content, "original");
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_search_and_filter() {
        let mut store = HistoryStore::default();
        store.insert("https://example.com", ContentKind::Url);
        store.insert("Hello World", ContentKind::Text);
        store.insert("import os", ContentKind::Code);

        assert_eq!(contents(&store.search("hello")), vec!["Hello World"]);
        assert_eq!(contents(&store.search("o")).len(), 3);
        assert_eq!(
            contents(&store.filter_by_kind(ContentKind::Url)),
            vec!["https://example.com"]
        );
        assert!(store.filter_by_kind(ContentKind::Path).is_empty());
    }

    #[test]
    fn test_stats() {
        let mut store = HistoryStore::default();
        store.insert("abc", ContentKind::Text);
        store.insert("https://a.io", ContentKind::Url);
        store.insert("def", ContentKind::Text);

        let stats = store.stats();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.text_items, 2);
        assert_eq!(stats.url_items, 1);
        assert_eq!(stats.total_bytes, 3 + 12 + 3);
        assert!(stats.oldest_item <= stats.newest_item);

        assert_eq!(HistoryStore::default().stats(), HistoryStats::default());
    }

    #[test]
    fn test_export_json() {
        let mut store = HistoryStore::default();
        store.insert("first", ContentKind::Text);
        store.insert("https://second.io", ContentKind::Url);

        let mut buffer = Vec::new();
        store.export_json(&mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["content"], "https://second.io");
        assert_eq!(items[0]["kind"], "URL");
        assert_eq!(items[1]["byte_size"], 5);
    }

    #[test]
    fn test_kind_display_matches_serde() {
        for kind in ContentKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut store = HistoryStore::new(0);
        store.insert("a", ContentKind::Text);
        store.insert("b", ContentKind::Text);
        assert_eq!(store.capacity(), 1);
        assert_eq!(contents(&store.snapshot(5)), vec!["b"]);
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(HistoryStore::default().capacity(), MAX_HISTORY);
    }
}
