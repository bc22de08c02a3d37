//! Kestrel Render Backend
//!
//! The page-rendering engine lives outside this workspace. Tabs talk to it
//! only through the asynchronous commands of [`RenderBackend`] and react to
//! the notifications it pushes as [`BackendEvent`]s.

mod error;
mod event;
#[cfg(any(test, feature = "test-support"))]
mod mock;
mod retry;
mod surface;

pub use error::BackendError;
pub use event::BackendEvent;
#[cfg(any(test, feature = "test-support"))]
pub use mock::MockBackend;
pub use retry::SurfaceRetryPolicy;
pub use surface::{with_deadline, BackendCommand, RenderBackend, SurfaceHandle};

pub type Result<T> = std::result::Result<T, BackendError>;
