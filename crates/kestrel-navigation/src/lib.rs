//! Kestrel Navigation
//!
//! Leaf helpers used by the tab registry:
//! - short unique identifiers for tabs, bookmarks and history entries
//! - title normalization (generic-title heuristic, HTML entity decoding)
//! - the global visit history ledger
//! - address bar input resolution (URL vs. search)

mod error;
mod history;
mod id;
mod input;
pub mod title;

pub use error::NavigationError;
pub use history::{HistoryEntry, HistoryLedger, DEFAULT_HISTORY_CAPACITY};
pub use id::generate_id;
pub use input::{InputResolution, InputResolver, DEFAULT_SEARCH_TEMPLATE};
pub use title::{
    decode_html_entities, is_generic_title, is_loading_placeholder, is_special_url, should_adopt_title,
    BLANK_URL, DEFAULT_TAB_TITLE, LOADING_TITLE,
};

pub type Result<T> = std::result::Result<T, NavigationError>;
