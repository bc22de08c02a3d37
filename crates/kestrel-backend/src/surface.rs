//! Render surface commands
//!
//! A render surface is the native view that displays one tab's page. The
//! surface for a tab is addressed by the tab id; the handle returned on
//! creation is opaque to the tab layer.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::error::BackendError;
use crate::Result;

/// Opaque handle to a native render surface
pub type SurfaceHandle = String;

/// Commands consumed from the rendering engine.
///
/// Every call is an independent asynchronous request. Callers treat a failure
/// as a degraded outcome, never as a reason to undo local state.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    async fn create_render_surface(
        &self,
        tab_id: &str,
        url: &str,
        title: &str,
    ) -> Result<SurfaceHandle>;

    async fn show_render_surface(&self, tab_id: &str) -> Result<()>;

    async fn hide_all_render_surfaces(&self) -> Result<()>;

    async fn close_render_surface(&self, tab_id: &str) -> Result<()>;

    async fn navigate_render_surface(&self, tab_id: &str, url: &str) -> Result<()>;

    /// Returns the favicon of `url` as a `data:` URL
    async fn fetch_favicon(&self, url: &str) -> Result<String>;

    async fn fetch_page_title(&self, url: &str) -> Result<String>;

    async fn mute_render_surface(&self, tab_id: &str) -> Result<()>;

    async fn unmute_render_surface(&self, tab_id: &str) -> Result<()>;

    async fn open_new_window(&self) -> Result<()>;

    async fn close_current_window(&self) -> Result<()>;
}

/// A backend command with its arguments, used for logging and recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    CreateSurface { tab_id: String, url: String },
    ShowSurface { tab_id: String },
    HideAllSurfaces,
    CloseSurface { tab_id: String },
    NavigateSurface { tab_id: String, url: String },
    FetchFavicon { url: String },
    FetchPageTitle { url: String },
    MuteSurface { tab_id: String },
    UnmuteSurface { tab_id: String },
    OpenNewWindow,
    CloseCurrentWindow,
}

impl BackendCommand {
    pub const CREATE_SURFACE: &'static str = "create_render_surface";
    pub const SHOW_SURFACE: &'static str = "show_render_surface";
    pub const HIDE_ALL_SURFACES: &'static str = "hide_all_render_surfaces";
    pub const CLOSE_SURFACE: &'static str = "close_render_surface";
    pub const NAVIGATE_SURFACE: &'static str = "navigate_render_surface";
    pub const FETCH_FAVICON: &'static str = "fetch_favicon";
    pub const FETCH_PAGE_TITLE: &'static str = "fetch_page_title";
    pub const MUTE_SURFACE: &'static str = "mute_render_surface";
    pub const UNMUTE_SURFACE: &'static str = "unmute_render_surface";
    pub const OPEN_NEW_WINDOW: &'static str = "open_new_window";
    pub const CLOSE_CURRENT_WINDOW: &'static str = "close_current_window";

    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::CreateSurface { .. } => Self::CREATE_SURFACE,
            BackendCommand::ShowSurface { .. } => Self::SHOW_SURFACE,
            BackendCommand::HideAllSurfaces => Self::HIDE_ALL_SURFACES,
            BackendCommand::CloseSurface { .. } => Self::CLOSE_SURFACE,
            BackendCommand::NavigateSurface { .. } => Self::NAVIGATE_SURFACE,
            BackendCommand::FetchFavicon { .. } => Self::FETCH_FAVICON,
            BackendCommand::FetchPageTitle { .. } => Self::FETCH_PAGE_TITLE,
            BackendCommand::MuteSurface { .. } => Self::MUTE_SURFACE,
            BackendCommand::UnmuteSurface { .. } => Self::UNMUTE_SURFACE,
            BackendCommand::OpenNewWindow => Self::OPEN_NEW_WINDOW,
            BackendCommand::CloseCurrentWindow => Self::CLOSE_CURRENT_WINDOW,
        }
    }
}

impl std::fmt::Display for BackendCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Run a backend call, failing with [`BackendError::Timeout`] if it does not
/// resolve within `after`.
pub async fn with_deadline<T, F>(command: &'static str, after: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout { command, after }),
    }
}
