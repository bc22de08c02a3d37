//! Backend error types

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend command {command} failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },

    #[error("Backend command {command} timed out after {after:?}")]
    Timeout {
        command: &'static str,
        after: Duration,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl BackendError {
    pub fn command(command: &'static str, message: impl Into<String>) -> Self {
        BackendError::Command {
            command,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Timeout { .. })
    }
}
