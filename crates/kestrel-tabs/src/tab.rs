//! Tab data structure
//!
//! A tab is one browsing context: its location, its own back/forward stack,
//! and the status flags shown in the tab strip (loading, favicon, audio,
//! load error).

use kestrel_backend::SurfaceHandle;
use kestrel_navigation::{generate_id, BLANK_URL, DEFAULT_TAB_TITLE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Current URL, `about:blank` when no surface is attached
    pub url: String,
    pub is_active: bool,
    pub is_loading: bool,
    /// Favicon as a data URL
    pub favicon: Option<String>,
    /// Back/forward stack, never empty
    pub history: Vec<String>,
    pub history_index: usize,
    /// Render surface backing this tab
    pub surface: Option<SurfaceHandle>,
    pub has_audio: bool,
    pub is_audio_muted: bool,
    pub has_error: bool,
    pub error_message: Option<String>,
    /// Bumped on every navigation attempt; async work started for an older
    /// attempt compares against it and drops its result
    #[serde(skip)]
    pub(crate) navigation_generation: u64,
}

impl Tab {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_id(generate_id(), url, title)
    }

    pub fn with_id(id: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: id.into(),
            title: title.into(),
            history: vec![url.clone()],
            url,
            is_active: false,
            is_loading: false,
            favicon: None,
            history_index: 0,
            surface: None,
            has_audio: false,
            is_audio_muted: false,
            has_error: false,
            error_message: None,
            navigation_generation: 0,
        }
    }

    /// A fresh `about:blank` tab
    pub fn blank() -> Self {
        Self::new(BLANK_URL, DEFAULT_TAB_TITLE)
    }

    pub fn is_blank(&self) -> bool {
        self.url == BLANK_URL
    }

    /// Append `url` to the back/forward stack, dropping forward entries.
    ///
    /// Returns false when `url` is already the current entry.
    pub fn push_history(&mut self, url: &str) -> bool {
        if self.history.get(self.history_index).map(String::as_str) == Some(url) {
            return false;
        }

        self.history.truncate(self.history_index + 1);
        self.history.push(url.to_string());
        self.history_index = self.history.len() - 1;
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    /// Start a new navigation attempt and return its generation
    pub(crate) fn begin_navigation(&mut self) -> u64 {
        self.navigation_generation += 1;
        self.navigation_generation
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.has_error = true;
        self.error_message = Some(message.into());
        self.is_loading = false;
    }

    pub fn clear_error(&mut self) {
        self.has_error = false;
        self.error_message = None;
    }

    /// Record audio presence; losing audio also drops the mute flag
    pub fn set_has_audio(&mut self, has_audio: bool) {
        self.has_audio = has_audio;
        if !has_audio {
            self.is_audio_muted = false;
        }
    }

    /// Title with a fallback for tabs that never received one
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_TAB_TITLE
        } else {
            &self.title
        }
    }
}
