//! Kestrel Core
//!
//! Central coordination layer for the Kestrel browser shell. The
//! [`Browser`] owns the tab registry, bookmarks and address-bar resolver,
//! and pumps render backend events into the registry.

mod bookmarks;
mod browser;
mod config;
mod error;

pub use bookmarks::{Bookmark, BookmarkStore};
pub use browser::Browser;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use kestrel_backend::{
    BackendCommand, BackendError, BackendEvent, RenderBackend, SurfaceRetryPolicy,
};
pub use kestrel_hotkeys::{FocusRequest, FocusTarget, HotkeyAction, KeyEvent, KeyOutcome};
pub use kestrel_navigation::{
    HistoryEntry, HistoryLedger, InputResolution, InputResolver, NavigationError,
};
pub use kestrel_tabs::{Tab, TabError, TabRegistry, TabsConfig};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
