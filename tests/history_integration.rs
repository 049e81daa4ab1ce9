//! Integration tests for the clipboard history store

use std::collections::HashSet;

use edgeboard::history::{classify, ContentKind, HistoryStore};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

fn contents(store: &HistoryStore, limit: usize) -> Vec<String> {
    store
        .snapshot(limit)
        .into_iter()
        .map(|entry| entry.content)
        .collect()
}

#[test]
fn test_dedup_moves_content_to_head() {
    let mut store = HistoryStore::default();
    store.insert("x", ContentKind::Text);
    store.insert("y", ContentKind::Text);
    store.insert("x", ContentKind::Text);

    assert_eq!(store.count(), 2);
    assert_eq!(contents(&store, 10), vec!["x", "y"]);
}

#[test]
fn test_capacity_keeps_most_recent_fifty() {
    let mut store = HistoryStore::default();
    for i in 0..60 {
        store.insert(format!("entry-{}", i), ContentKind::Text);
    }

    assert_eq!(store.count(), 50);
    let expected: Vec<String> = (10..60).rev().map(|i| format!("entry-{}", i)).collect();
    assert_eq!(contents(&store, 50), expected);
}

#[test]
fn test_order_and_clear() {
    let mut store = HistoryStore::default();
    for content in ["a", "b", "c"] {
        store.insert(content, classify(content));
    }
    assert_eq!(contents(&store, 3), vec!["c", "b", "a"]);

    store.clear();
    assert_eq!(store.count(), 0);
    assert!(store.snapshot(10).is_empty());
}

#[test]
fn test_export_to_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("exports").join("history.json");

    let mut store = HistoryStore::default();
    store.insert("/etc/hosts.bak", ContentKind::Path);
    store.insert("fn main() {}", ContentKind::Code);
    store.export_to_path(&path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["kind"], "CODE");
    assert_eq!(items[1]["content"], "/etc/hosts.bak");
}

proptest! {
    #[test]
    fn prop_store_invariants(
        inputs in prop::collection::vec("[a-e]{1,2}", 0..200),
        capacity in 1usize..20,
    ) {
        let mut store = HistoryStore::new(capacity);
        for input in &inputs {
            store.insert(input.as_str(), classify(input));
        }

        let snapshot = contents(&store, usize::MAX);

        // Capacity bound
        prop_assert!(store.count() <= capacity);
        prop_assert_eq!(snapshot.len(), store.count());

        // Unique content
        let unique: HashSet<&String> = snapshot.iter().collect();
        prop_assert_eq!(unique.len(), snapshot.len());

        // Order follows the most recent insert of each value
        let mut expected = Vec::new();
        for input in inputs.iter().rev() {
            if !expected.contains(input) {
                expected.push(input.clone());
            }
        }
        expected.truncate(capacity);
        prop_assert_eq!(snapshot, expected);
    }

    #[test]
    fn prop_classify_is_deterministic(input in ".*") {
        prop_assert_eq!(classify(&input), classify(&input));
    }
}
