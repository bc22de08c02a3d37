//! Kestrel Hotkeys
//!
//! Global keyboard shortcuts. A key event is classified into a
//! [`HotkeyAction`], dropped if it was typed into a text field (unless the
//! action is one that must always work), and dispatched to the tab registry,
//! the window commands of the render backend, or the address-bar focus signal.

mod action;
mod event;
mod router;

pub use action::HotkeyAction;
pub use event::{FocusTarget, KeyEvent};
pub use router::{next_tab_index, FocusRequest, HotkeyRouter, KeyOutcome};
