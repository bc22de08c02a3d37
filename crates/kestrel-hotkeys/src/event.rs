//! Keyboard events as delivered by the presentation layer

use serde::{Deserialize, Serialize};

/// The element that had focus when the key was pressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusTarget {
    pub tag_name: String,
    #[serde(default)]
    pub content_editable: bool,
}

impl FocusTarget {
    pub fn element(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            content_editable: false,
        }
    }

    pub fn input() -> Self {
        Self::element("INPUT")
    }

    pub fn textarea() -> Self {
        Self::element("TEXTAREA")
    }

    pub fn editable(mut self) -> Self {
        self.content_editable = true;
        self
    }

    /// Text inputs, text areas and content-editable elements
    pub fn accepts_text(&self) -> bool {
        self.tag_name.eq_ignore_ascii_case("input")
            || self.tag_name.eq_ignore_ascii_case("textarea")
            || self.content_editable
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    /// Key value, e.g. `"t"`, `"T"`, `"Tab"`, `"F5"`
    pub key: String,
    #[serde(default, rename = "ctrlKey")]
    pub ctrl: bool,
    #[serde(default, rename = "metaKey")]
    pub meta: bool,
    #[serde(default, rename = "shiftKey")]
    pub shift: bool,
    #[serde(default, rename = "altKey")]
    pub alt: bool,
    #[serde(default)]
    pub target: Option<FocusTarget>,
    #[serde(default)]
    pub default_prevented: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            meta: false,
            shift: false,
            alt: false,
            target: None,
            default_prevented: false,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_target(mut self, target: FocusTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Ctrl on Linux/Windows, Cmd on macOS
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Case-insensitive match on the key value
    pub fn is_key(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}
