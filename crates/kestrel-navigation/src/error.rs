//! Navigation error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Invalid search engine template: {0}")]
    InvalidSearchTemplate(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
