//! Main browser state container
//!
//! The browser owns the process-wide state: one tab registry (with its
//! history ledger), the bookmarks and the address-bar resolver. The render
//! backend pushes its events into an unbounded channel that a single pump
//! task drains into the registry in arrival order.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use kestrel_backend::{with_deadline, BackendCommand, BackendEvent, RenderBackend};
use kestrel_hotkeys::{FocusRequest, HotkeyRouter, KeyEvent, KeyOutcome};
use kestrel_navigation::{
    HistoryEntry, HistoryLedger, InputResolution, InputResolver, BLANK_URL, DEFAULT_TAB_TITLE,
};
use kestrel_tabs::{Tab, TabRegistry};

use crate::bookmarks::{Bookmark, BookmarkStore};
use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

/// Main browser instance
pub struct Browser {
    /// Configuration
    config: Config,
    /// Tabs, active pointer and global history
    registry: TabRegistry,
    /// Keyboard shortcut dispatch
    hotkeys: HotkeyRouter,
    bookmarks: BookmarkStore,
    /// Input resolver for address bar
    input_resolver: Arc<RwLock<InputResolver>>,
    events: mpsc::UnboundedSender<BackendEvent>,
    /// Taken by the event pump when it starts
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<BackendEvent>>>,
}

impl Browser {
    pub fn new(config: Config, backend: Arc<dyn RenderBackend>) -> Result<Self> {
        config.validate()?;

        let registry = TabRegistry::new(backend, config.tabs_config());
        let hotkeys = HotkeyRouter::new(registry.clone());
        let bookmarks = if config.seed_default_bookmarks {
            BookmarkStore::with_defaults()
        } else {
            BookmarkStore::new()
        };
        let input_resolver = Arc::new(RwLock::new(InputResolver::with_search_engine(
            config.search_engine.clone(),
        )?));
        let (events, event_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            registry,
            hotkeys,
            bookmarks,
            input_resolver,
            events,
            event_rx: Mutex::new(Some(event_rx)),
        })
    }

    /// Open the first tab
    pub async fn initialize(&self) {
        self.registry.initialize().await;
        tracing::info!(tabs = self.registry.len(), "Browser initialized");
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    // ==================== Backend events ====================

    /// Channel the render backend pushes its events into
    pub fn event_sender(&self) -> mpsc::UnboundedSender<BackendEvent> {
        self.events.clone()
    }

    /// Start draining backend events into the tab registry
    pub fn spawn_event_pump(&self) -> Result<JoinHandle<()>> {
        let mut rx = self
            .event_rx
            .lock()
            .take()
            .ok_or(CoreError::EventPumpStarted)?;
        let registry = self.registry.clone();

        Ok(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                registry.apply_event(event).await;
            }
            tracing::debug!("Backend event channel closed");
        }))
    }

    // ==================== Tabs ====================

    pub async fn new_tab(&self) -> String {
        self.registry.add_tab(BLANK_URL, DEFAULT_TAB_TITLE).await
    }

    pub async fn open_tab(&self, url: &str) -> String {
        self.registry.add_tab(url, DEFAULT_TAB_TITLE).await
    }

    pub async fn close_tab(&self, tab_id: &str) {
        self.registry.close_tab(tab_id).await;
    }

    pub async fn activate_tab(&self, tab_id: &str) {
        self.registry.set_active_tab(tab_id).await;
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.registry.tabs()
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.registry.active_tab()
    }

    pub fn get_tab(&self, tab_id: &str) -> Result<Tab> {
        Ok(self.registry.get_tab(tab_id)?)
    }

    // ==================== Navigation ====================

    pub fn resolve_input(&self, input: &str) -> InputResolution {
        self.input_resolver.read().resolve(input)
    }

    /// Resolve address bar text and navigate the tab to the result
    pub async fn navigate_input(&self, tab_id: &str, input: &str) -> InputResolution {
        let resolution = self.resolve_input(input);
        tracing::debug!(tab_id = %tab_id, search = resolution.is_search(), "Resolved address bar input");
        self.registry.update_tab_url(tab_id, resolution.url()).await;
        resolution
    }

    pub async fn navigate_to_home(&self, tab_id: &str) {
        self.registry
            .update_tab_url(tab_id, &self.config.homepage)
            .await;
    }

    pub async fn go_back(&self, tab_id: &str) {
        self.registry.navigate_back(tab_id).await;
    }

    pub async fn go_forward(&self, tab_id: &str) {
        self.registry.navigate_forward(tab_id).await;
    }

    pub async fn reload(&self, tab_id: &str) {
        self.registry.reload_tab(tab_id).await;
    }

    pub fn search_engine(&self) -> String {
        self.input_resolver.read().search_template().to_string()
    }

    pub fn set_search_engine(&self, template: &str) -> Result<()> {
        self.input_resolver.write().set_search_engine(template)?;
        tracing::info!(template = %template, "Search engine changed");
        Ok(())
    }

    // ==================== Hotkeys ====================

    pub async fn handle_key(&self, event: &mut KeyEvent) -> KeyOutcome {
        self.hotkeys.handle(event).await
    }

    pub fn subscribe_focus(&self) -> broadcast::Receiver<FocusRequest> {
        self.hotkeys.subscribe_focus()
    }

    // ==================== Windows ====================

    pub async fn open_new_window(&self) -> Result<()> {
        let backend = self.registry.backend();
        with_deadline(
            BackendCommand::OPEN_NEW_WINDOW,
            self.registry.config().backend_timeout,
            backend.open_new_window(),
        )
        .await?;
        Ok(())
    }

    pub async fn close_current_window(&self) -> Result<()> {
        let backend = self.registry.backend();
        with_deadline(
            BackendCommand::CLOSE_CURRENT_WINDOW,
            self.registry.config().backend_timeout,
            backend.close_current_window(),
        )
        .await?;
        Ok(())
    }

    // ==================== History ====================

    pub fn history(&self) -> &HistoryLedger {
        self.registry.history()
    }

    pub fn recent_history(&self, limit: usize) -> Vec<HistoryEntry> {
        self.history().recent(limit)
    }

    pub fn search_history(&self, query: &str, limit: usize) -> Vec<HistoryEntry> {
        self.history().search(query, limit)
    }

    pub fn clear_history(&self) {
        self.history().clear();
    }

    // ==================== Bookmarks ====================

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    /// Bookmark the tab's current page
    pub fn bookmark_tab(&self, tab_id: &str) -> Result<Bookmark> {
        let tab = self.registry.get_tab(tab_id)?;
        Ok(self
            .bookmarks
            .add(tab.display_title(), &tab.url, tab.favicon.clone()))
    }
}
