//! In-memory bookmarks
//!
//! Bookmarks are independent of tabs. One bookmark per URL; adding a URL
//! that is already bookmarked refreshes the existing entry.

use chrono::{DateTime, Utc};
use kestrel_navigation::generate_id;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub favicon: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            title: title.into(),
            url: url.into(),
            favicon: None,
            created_at: Utc::now(),
        }
    }
}

pub struct BookmarkStore {
    bookmarks: Arc<RwLock<Vec<Bookmark>>>,
}

impl BookmarkStore {
    pub fn new() -> Self {
        Self {
            bookmarks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Store seeded with the stock bookmarks
    pub fn with_defaults() -> Self {
        let store = Self::new();
        store.add("Google", "https://www.google.com", None);
        store.add("GitHub", "https://github.com", None);
        store
    }

    /// Add a bookmark, or refresh the existing one for the same URL
    pub fn add(&self, title: &str, url: &str, favicon: Option<String>) -> Bookmark {
        let mut bookmarks = self.bookmarks.write();

        if let Some(existing) = bookmarks.iter_mut().find(|b| b.url == url) {
            let title = title.trim();
            if !title.is_empty() {
                existing.title = title.to_string();
            }
            if favicon.is_some() {
                existing.favicon = favicon;
            }
            tracing::debug!(url = %url, "Bookmark updated");
            return existing.clone();
        }

        let title = match title.trim() {
            "" => url,
            t => t,
        };
        let mut bookmark = Bookmark::new(title, url);
        bookmark.favicon = favicon;
        bookmarks.push(bookmark.clone());

        tracing::info!(bookmark_id = %bookmark.id, url = %url, "Added bookmark");
        bookmark
    }

    pub fn remove(&self, id: &str) -> Option<Bookmark> {
        let mut bookmarks = self.bookmarks.write();
        let index = bookmarks.iter().position(|b| b.id == id)?;
        let removed = bookmarks.remove(index);
        tracing::info!(bookmark_id = %id, url = %removed.url, "Removed bookmark");
        Some(removed)
    }

    pub fn list(&self) -> Vec<Bookmark> {
        self.bookmarks.read().clone()
    }

    pub fn find_by_url(&self, url: &str) -> Option<Bookmark> {
        self.bookmarks.read().iter().find(|b| b.url == url).cloned()
    }

    pub fn is_bookmarked(&self, url: &str) -> bool {
        self.bookmarks.read().iter().any(|b| b.url == url)
    }

    pub fn len(&self) -> usize {
        self.bookmarks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.read().is_empty()
    }
}

impl Default for BookmarkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for BookmarkStore {
    fn clone(&self) -> Self {
        Self {
            bookmarks: Arc::clone(&self.bookmarks),
        }
    }
}
