//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Backend error: {0}")]
    Backend(#[from] kestrel_backend::BackendError),

    #[error("Tab error: {0}")]
    Tab(#[from] kestrel_tabs::TabError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] kestrel_navigation::NavigationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event pump already started")]
    EventPumpStarted,
}
