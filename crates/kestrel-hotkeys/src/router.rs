//! Hotkey dispatch
//!
//! classify -> ignore check -> dispatch. The router keeps no state of its
//! own beyond the focus-request channel; everything else lives in the
//! [`TabRegistry`].

use kestrel_backend::{with_deadline, BackendCommand};
use kestrel_navigation::{BLANK_URL, DEFAULT_TAB_TITLE};
use kestrel_tabs::{Tab, TabRegistry};
use tokio::sync::broadcast;

use crate::action::HotkeyAction;
use crate::event::{FocusTarget, KeyEvent};

const FOCUS_CHANNEL_CAPACITY: usize = 16;

/// Signal for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequest {
    AddressBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The event matched and its default action was prevented
    Handled(HotkeyAction),
    /// The event was typed into a text field and left alone
    Ignored,
    /// Not a shortcut
    PassThrough,
}

pub struct HotkeyRouter {
    registry: TabRegistry,
    focus: broadcast::Sender<FocusRequest>,
}

impl HotkeyRouter {
    pub fn new(registry: TabRegistry) -> Self {
        let (focus, _) = broadcast::channel(FOCUS_CHANNEL_CAPACITY);
        Self { registry, focus }
    }

    /// Receive address-bar focus requests
    pub fn subscribe_focus(&self) -> broadcast::Receiver<FocusRequest> {
        self.focus.subscribe()
    }

    pub fn is_text_entry_target(target: Option<&FocusTarget>) -> bool {
        target.is_some_and(FocusTarget::accepts_text)
    }

    pub fn should_ignore(&self, event: &KeyEvent) -> bool {
        if HotkeyAction::classify(event).is_some_and(|action| action.always_allowed()) {
            return false;
        }
        Self::is_text_entry_target(event.target.as_ref())
    }

    /// Handle one keydown event, marking it default-prevented when it matches
    pub async fn handle(&self, event: &mut KeyEvent) -> KeyOutcome {
        if self.should_ignore(event) {
            return KeyOutcome::Ignored;
        }

        let Some(action) = HotkeyAction::classify(event) else {
            return KeyOutcome::PassThrough;
        };

        event.prevent_default();
        self.dispatch(action).await;
        KeyOutcome::Handled(action)
    }

    pub async fn dispatch(&self, action: HotkeyAction) {
        tracing::debug!(action = %action, "Hotkey");

        match action {
            HotkeyAction::Reload => {
                if let Some(id) = self.registry.active_tab_id() {
                    self.registry.reload_tab(&id).await;
                }
            }
            HotkeyAction::NewTab => {
                self.registry.add_tab(BLANK_URL, DEFAULT_TAB_TITLE).await;
            }
            HotkeyAction::FocusAddressBar => {
                if self.focus.send(FocusRequest::AddressBar).is_err() {
                    tracing::debug!("No address bar listening for focus requests");
                }
            }
            HotkeyAction::CloseTab => {
                if let Some(id) = self.registry.active_tab_id() {
                    self.registry.close_tab(&id).await;
                }
            }
            HotkeyAction::NewWindow => {
                tracing::info!("Opening new window");
                let backend = self.registry.backend();
                if let Err(e) = with_deadline(
                    BackendCommand::OPEN_NEW_WINDOW,
                    self.registry.config().backend_timeout,
                    backend.open_new_window(),
                )
                .await
                {
                    tracing::warn!(error = %e, "Failed to open new window");
                }
            }
            HotkeyAction::NewPrivateWindow => {
                tracing::info!("Private windows are not available");
            }
            HotkeyAction::CloseWindow => {
                tracing::info!("Closing current window");
                let backend = self.registry.backend();
                if let Err(e) = with_deadline(
                    BackendCommand::CLOSE_CURRENT_WINDOW,
                    self.registry.config().backend_timeout,
                    backend.close_current_window(),
                )
                .await
                {
                    tracing::warn!(error = %e, "Failed to close window");
                }
            }
            HotkeyAction::NextTab => self.cycle(true).await,
            HotkeyAction::PreviousTab => self.cycle(false).await,
        }
    }

    async fn cycle(&self, forward: bool) {
        let tabs = self.registry.tabs();
        if let Some(index) = next_tab_index(&tabs, forward) {
            self.registry.set_active_tab(&tabs[index].id).await;
        }
    }
}

/// Index of the tab to activate when cycling. A single inactive blank tab
/// next in line is skipped; a run of several blanks is only skipped by one.
pub fn next_tab_index(tabs: &[Tab], forward: bool) -> Option<usize> {
    let count = tabs.len();
    if count <= 1 {
        return None;
    }

    let step = |index: usize| {
        if forward {
            (index + 1) % count
        } else {
            (index + count - 1) % count
        }
    };

    let mut next = match tabs.iter().position(|t| t.is_active) {
        Some(active) => step(active),
        None if forward => 0,
        None => count - 1,
    };

    if tabs[next].is_blank() && !tabs[next].is_active {
        next = step(next);
    }
    Some(next)
}
