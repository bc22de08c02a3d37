//! Shortcut classification

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::event::KeyEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HotkeyAction {
    Reload,
    NewTab,
    FocusAddressBar,
    CloseTab,
    NewWindow,
    NewPrivateWindow,
    CloseWindow,
    NextTab,
    PreviousTab,
}

impl HotkeyAction {
    /// Map a key combination to its action. Earlier rules win.
    pub fn classify(event: &KeyEvent) -> Option<Self> {
        let cmd = event.has_command_modifier();
        let shift = event.shift;

        if (cmd && event.is_key("r")) || event.key == "F5" {
            return Some(Self::Reload);
        }
        if !cmd {
            return None;
        }

        let action = if event.is_key("t") && !shift {
            Self::NewTab
        } else if event.is_key("l") {
            Self::FocusAddressBar
        } else if event.is_key("w") && !shift {
            Self::CloseTab
        } else if event.is_key("n") && !shift {
            Self::NewWindow
        } else if event.is_key("n") {
            Self::NewPrivateWindow
        } else if event.is_key("w") {
            Self::CloseWindow
        } else if event.key == "Tab" && !shift {
            Self::NextTab
        } else if event.key == "Tab" {
            Self::PreviousTab
        } else {
            return None;
        };

        Some(action)
    }

    /// Actions honoured even while the user is typing in a text field
    pub fn always_allowed(&self) -> bool {
        !matches!(self, Self::Reload | Self::NewTab)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::NewTab => "new-tab",
            Self::FocusAddressBar => "focus-address-bar",
            Self::CloseTab => "close-tab",
            Self::NewWindow => "new-window",
            Self::NewPrivateWindow => "new-private-window",
            Self::CloseWindow => "close-window",
            Self::NextTab => "next-tab",
            Self::PreviousTab => "previous-tab",
        }
    }
}

impl fmt::Display for HotkeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
