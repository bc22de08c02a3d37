//! Events pushed by the rendering engine
//!
//! Events arrive asynchronously and in no particular order relative to the
//! commands issued by the tab layer. Payloads carry the id of the tab they
//! concern; consumers look the tab up again on receipt.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BackendEvent {
    /// The surface committed a navigation to a new URL
    #[serde(rename = "surface-url-changed", rename_all = "camelCase")]
    UrlChanged { tab_id: String, url: String },

    /// The page reported a title, possibly HTML-entity encoded
    #[serde(rename = "surface-title-changed", rename_all = "camelCase")]
    TitleChanged { tab_id: String, title: String },

    #[serde(rename = "surface-favicon-changed", rename_all = "camelCase")]
    FaviconChanged {
        tab_id: String,
        favicon: Option<String>,
    },

    /// The engine opened a surface on its own (e.g. a `target="_blank"` link)
    #[serde(rename = "surface-created", rename_all = "camelCase")]
    SurfaceCreated {
        tab_id: String,
        url: String,
        title: String,
        surface: String,
    },

    #[serde(rename = "surface-audio-changed", rename_all = "camelCase")]
    AudioChanged { tab_id: String, has_audio: bool },

    #[serde(rename = "surface-mute-changed", rename_all = "camelCase")]
    MuteChanged { tab_id: String, is_muted: bool },

    #[serde(rename = "surface-load-error", rename_all = "camelCase")]
    LoadError {
        tab_id: String,
        error_message: String,
    },
}

impl BackendEvent {
    pub fn tab_id(&self) -> &str {
        match self {
            BackendEvent::UrlChanged { tab_id, .. }
            | BackendEvent::TitleChanged { tab_id, .. }
            | BackendEvent::FaviconChanged { tab_id, .. }
            | BackendEvent::SurfaceCreated { tab_id, .. }
            | BackendEvent::AudioChanged { tab_id, .. }
            | BackendEvent::MuteChanged { tab_id, .. }
            | BackendEvent::LoadError { tab_id, .. } => tab_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BackendEvent::UrlChanged { .. } => "surface-url-changed",
            BackendEvent::TitleChanged { .. } => "surface-title-changed",
            BackendEvent::FaviconChanged { .. } => "surface-favicon-changed",
            BackendEvent::SurfaceCreated { .. } => "surface-created",
            BackendEvent::AudioChanged { .. } => "surface-audio-changed",
            BackendEvent::MuteChanged { .. } => "surface-mute-changed",
            BackendEvent::LoadError { .. } => "surface-load-error",
        }
    }
}
