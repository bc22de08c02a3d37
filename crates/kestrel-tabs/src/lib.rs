//! Kestrel Tab Management
//!
//! The [`TabRegistry`] owns every open tab and the active-tab pointer. It
//! drives the render backend for each tab and folds the backend's
//! asynchronous events back into tab state.

mod config;
mod error;
mod registry;
mod tab;

pub use config::TabsConfig;
pub use error::TabError;
pub use registry::TabRegistry;
pub use tab::Tab;

pub type Result<T> = std::result::Result<T, TabError>;
