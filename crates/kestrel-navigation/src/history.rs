//! Global visit history
//!
//! One entry per URL, most recently *recorded* first. A repeat visit updates
//! the existing entry in place rather than moving it, so ledger order is the
//! order in which URLs were first seen (newest first).

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::id::generate_id;

pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    pub visited_at: DateTime<Utc>,
    pub visit_count: u32,
}

pub struct HistoryLedger {
    entries: Arc<RwLock<Vec<HistoryEntry>>>,
    capacity: usize,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a visit to a URL
    pub fn record(&self, title: &str, url: &str) {
        let mut entries = self.entries.write();

        if let Some(existing) = entries.iter_mut().find(|e| e.url == url) {
            existing.visited_at = Utc::now();
            existing.visit_count += 1;
            tracing::debug!(url = %url, visits = existing.visit_count, "Repeat visit recorded");
        } else {
            entries.insert(
                0,
                HistoryEntry {
                    id: generate_id(),
                    title: title.to_string(),
                    url: url.to_string(),
                    visited_at: Utc::now(),
                    visit_count: 1,
                },
            );
            tracing::debug!(url = %url, "New history entry");
        }

        if entries.len() > self.capacity {
            entries.truncate(self.capacity);
        }
    }

    /// Update the stored title for a URL without counting a visit
    pub fn update_title(&self, url: &str, title: &str) {
        if title.trim().is_empty() {
            return;
        }

        if let Some(entry) = self.entries.write().iter_mut().find(|e| e.url == url) {
            entry.title = title.to_string();
        }
    }

    pub fn find_by_url(&self, url: &str) -> Option<HistoryEntry> {
        self.entries.read().iter().find(|e| e.url == url).cloned()
    }

    /// Entries ordered by last visit, newest first
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let mut entries = self.entries.read().clone();
        entries.sort_by(|a, b| b.visited_at.cmp(&a.visited_at));
        entries.truncate(limit);
        entries
    }

    /// Case-insensitive substring search over URL and title
    pub fn search(&self, query: &str, limit: usize) -> Vec<HistoryEntry> {
        let needle = query.to_lowercase();
        let mut matches: Vec<HistoryEntry> = self
            .entries
            .read()
            .iter()
            .filter(|e| {
                e.url.to_lowercase().contains(&needle) || e.title.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.visited_at
                .cmp(&a.visited_at)
                .then_with(|| b.visit_count.cmp(&a.visit_count))
        });
        matches.truncate(limit);
        matches
    }

    /// Ledger contents in ledger order
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.read().clone()
    }

    pub fn remove(&self, id: &str) -> Option<HistoryEntry> {
        let mut entries = self.entries.write();
        let index = entries.iter().position(|e| e.id == id)?;
        Some(entries.remove(index))
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        tracing::info!("History cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for HistoryLedger {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_ledger() {
        let ledger = HistoryLedger::new();

        ledger.record("Example", "https://example.com");
        ledger.record("Rust", "https://rust-lang.org");
        ledger.record("Example again", "https://example.com");

        assert_eq!(ledger.len(), 2);

        let entry = ledger.find_by_url("https://example.com").unwrap();
        assert_eq!(entry.visit_count, 2);
        // Repeat visits keep the first title
        assert_eq!(entry.title, "Example");

        // Newest first, repeat visit does not reorder
        let entries = ledger.entries();
        assert_eq!(entries[0].url, "https://rust-lang.org");
        assert_eq!(entries[1].url, "https://example.com");

        let results = ledger.search("RUST", 10);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let ledger = HistoryLedger::with_capacity(3);
        for i in 0..5 {
            ledger.record("Page", &format!("https://example.com/{}", i));
        }

        assert_eq!(ledger.len(), 3);
        assert!(ledger.find_by_url("https://example.com/0").is_none());
        assert!(ledger.find_by_url("https://example.com/1").is_none());
        assert!(ledger.find_by_url("https://example.com/4").is_some());
    }

    #[test]
    fn test_default_capacity_bound() {
        let ledger = HistoryLedger::new();
        for i in 0..(DEFAULT_HISTORY_CAPACITY + 25) {
            ledger.record("Page", &format!("https://example.com/{}", i));
        }
        assert_eq!(ledger.len(), DEFAULT_HISTORY_CAPACITY);

        ledger.record("Page", &format!("https://example.com/{}", DEFAULT_HISTORY_CAPACITY));
        assert_eq!(ledger.len(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_update_title_keeps_visit_count() {
        let ledger = HistoryLedger::new();
        ledger.record("Loading...", "https://example.com");
        ledger.update_title("https://example.com", "Example Domain");
        ledger.update_title("https://example.com", "  ");

        let entry = ledger.find_by_url("https://example.com").unwrap();
        assert_eq!(entry.title, "Example Domain");
        assert_eq!(entry.visit_count, 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let ledger = HistoryLedger::new();
        ledger.record("A", "https://a.test");
        ledger.record("B", "https://b.test");

        let id = ledger.find_by_url("https://a.test").unwrap().id;
        assert!(ledger.remove(&id).is_some());
        assert!(ledger.remove(&id).is_none());
        assert_eq!(ledger.len(), 1);

        ledger.clear();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let ledger = HistoryLedger::new();
        let other = ledger.clone();
        other.record("A", "https://a.test");
        assert_eq!(ledger.len(), 1);
    }
}
