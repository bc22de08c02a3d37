//! Tab Registry
//!
//! Single source of truth for open tabs and the active-tab pointer.
//!
//! Local state is always updated first and backend commands are layered on
//! top as best-effort side effects: a failed command is logged and the tab
//! degrades (placeholder, stale favicon, unchanged title) but the operation
//! itself never fails. No lock is held across an `.await`; every
//! continuation looks its tab up again by id, so a tab closed mid-flight
//! turns the continuation into a no-op.

use kestrel_backend::{with_deadline, BackendCommand, BackendEvent, RenderBackend};
use kestrel_navigation::{
    decode_html_entities, is_special_url, should_adopt_title, HistoryLedger, BLANK_URL,
    DEFAULT_TAB_TITLE, LOADING_TITLE,
};
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::TabsConfig;
use crate::error::TabError;
use crate::tab::Tab;
use crate::Result;

#[derive(Default)]
struct RegistryState {
    tabs: Vec<Tab>,
    active_tab_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Back,
    Forward,
}

pub struct TabRegistry {
    state: Arc<RwLock<RegistryState>>,
    backend: Arc<dyn RenderBackend>,
    history: HistoryLedger,
    config: TabsConfig,
    /// Favicon and title fetches still in flight
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl TabRegistry {
    pub fn new(backend: Arc<dyn RenderBackend>, config: TabsConfig) -> Self {
        let history = HistoryLedger::with_capacity(config.history_capacity);
        Self::with_history(backend, config, history)
    }

    /// Build a registry that records visits into an existing ledger
    pub fn with_history(
        backend: Arc<dyn RenderBackend>,
        config: TabsConfig,
        history: HistoryLedger,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            backend,
            history,
            config,
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Open the first `about:blank` tab if the registry is empty
    pub async fn initialize(&self) {
        if self.state.read().tabs.is_empty() {
            self.add_tab(BLANK_URL, DEFAULT_TAB_TITLE).await;
        }
    }

    // ==================== Lifecycle ====================

    /// Create a tab, append it and make it active. Returns the new tab's id.
    pub async fn add_tab(&self, url: &str, title: &str) -> String {
        let is_blank = url == BLANK_URL;
        let tab = Tab::new(url, if is_blank { title } else { LOADING_TITLE });
        let tab_id = tab.id.clone();
        self.state.write().tabs.push(tab);

        tracing::info!(tab_id = %tab_id, url = %url, "Created new tab");

        if !is_blank {
            match self
                .call(
                    BackendCommand::CREATE_SURFACE,
                    self.backend.create_render_surface(&tab_id, url, LOADING_TITLE),
                )
                .await
            {
                Ok(surface) => {
                    let attached = self.with_tab(&tab_id, |tab| {
                        tab.surface = Some(surface);
                        tab.is_loading = true;
                        tab.begin_navigation()
                    });
                    match attached {
                        Some(generation) => {
                            self.arm_load_watchdog(&tab_id, generation);
                            self.refresh_favicon(&tab_id, url, generation);
                        }
                        None => self.discard_surface(&tab_id).await,
                    }
                }
                Err(e) => {
                    tracing::warn!(tab_id = %tab_id, url = %url, error = %e, "Surface creation failed, tab left as placeholder");
                }
            }
        }

        self.set_active_tab(&tab_id).await;
        tab_id
    }

    /// Close a tab. The registry is never left empty.
    pub async fn close_tab(&self, id: &str) {
        let has_surface = match self.find_tab(id) {
            Some(tab) => tab.surface.is_some(),
            None => return,
        };

        if has_surface {
            if let Err(e) = self
                .call(
                    BackendCommand::CLOSE_SURFACE,
                    self.backend.close_render_surface(id),
                )
                .await
            {
                tracing::warn!(tab_id = %id, error = %e, "Failed to close surface");
            }
        }

        let next_active = {
            let mut state = self.state.write();
            let Some(index) = state.tabs.iter().position(|t| t.id == id) else {
                return;
            };
            let removed = state.tabs.remove(index);

            if state.tabs.is_empty() {
                state.active_tab_id = None;
                None
            } else if removed.is_active {
                let next = index.min(state.tabs.len() - 1);
                Some(Some(state.tabs[next].id.clone()))
            } else {
                Some(None)
            }
        };

        tracing::info!(tab_id = %id, "Closed tab");

        match next_active {
            None => {
                self.add_tab(BLANK_URL, DEFAULT_TAB_TITLE).await;
            }
            Some(Some(next)) => self.set_active_tab(&next).await,
            Some(None) => {}
        }
    }

    /// Make `id` the only active tab and bring its surface to the front
    pub async fn set_active_tab(&self, id: &str) {
        let show = {
            let mut state = self.state.write();
            if !state.tabs.iter().any(|t| t.id == id) {
                return;
            }

            let mut show = false;
            for tab in state.tabs.iter_mut() {
                tab.is_active = tab.id == id;
                if tab.is_active {
                    show = tab.surface.is_some() && !tab.is_blank();
                }
            }
            state.active_tab_id = Some(id.to_string());
            show
        };

        tracing::debug!(tab_id = %id, "Activated tab");

        let result = if show {
            self.call(
                BackendCommand::SHOW_SURFACE,
                self.backend.show_render_surface(id),
            )
            .await
        } else {
            self.call(
                BackendCommand::HIDE_ALL_SURFACES,
                self.backend.hide_all_render_surfaces(),
            )
            .await
        };

        if let Err(e) = result {
            tracing::warn!(tab_id = %id, error = %e, "Failed to switch visible surface");
        }
    }

    // ==================== Navigation ====================

    /// Navigate a tab to `url`
    pub async fn update_tab_url(&self, id: &str, url: &str) {
        let Some(generation) = self.with_tab(id, |tab| {
            tab.is_loading = true;
            tab.clear_error();
            tab.url = url.to_string();
            tab.title = LOADING_TITLE.to_string();
            if tab.push_history(url) {
                tracing::debug!(tab_id = %tab.id, url = %url, index = tab.history_index, "Pushed tab history");
            }
            tab.begin_navigation()
        }) else {
            return;
        };

        tracing::info!(tab_id = %id, url = %url, "Navigating tab");

        let recordable = !is_special_url(url);
        if recordable {
            self.history.record(LOADING_TITLE, url);
        }
        self.arm_load_watchdog(id, generation);

        self.route_surface(id, url).await;

        if recordable {
            self.refresh_favicon(id, url, generation);
            self.refresh_title(id, url, generation);
        }

        self.with_navigation(id, generation, |tab| tab.is_loading = false);
    }

    pub async fn navigate_back(&self, id: &str) {
        self.step_history(id, Direction::Back).await;
    }

    pub async fn navigate_forward(&self, id: &str) {
        self.step_history(id, Direction::Forward).await;
    }

    async fn step_history(&self, id: &str, direction: Direction) {
        let Some((url, generation)) = self
            .with_tab(id, |tab| {
                let index = match direction {
                    Direction::Back if tab.can_go_back() => tab.history_index - 1,
                    Direction::Forward if tab.can_go_forward() => tab.history_index + 1,
                    _ => return None,
                };
                tab.history_index = index;
                tab.url = tab.history[index].clone();

                tab.title = match self.history.find_by_url(&tab.url) {
                    Some(entry) => entry.title,
                    None if tab.is_blank() => DEFAULT_TAB_TITLE.to_string(),
                    None => LOADING_TITLE.to_string(),
                };
                if is_special_url(&tab.url) {
                    tab.favicon = None;
                }

                Some((tab.url.clone(), tab.begin_navigation()))
            })
            .flatten()
        else {
            return;
        };

        tracing::info!(tab_id = %id, url = %url, direction = ?direction, "Stepping tab history");

        self.arm_load_watchdog(id, generation);
        self.route_surface(id, &url).await;

        if !is_special_url(&url) {
            self.refresh_favicon(id, &url, generation);
        }
    }

    /// Reload the tab's current URL without touching its history
    pub async fn reload_tab(&self, id: &str) {
        let Some((url, has_surface, generation)) = self.with_tab(id, |tab| {
            tab.is_loading = true;
            (tab.url.clone(), tab.surface.is_some(), tab.begin_navigation())
        }) else {
            return;
        };

        if !has_surface || url == BLANK_URL {
            self.with_navigation(id, generation, |tab| tab.is_loading = false);
            return;
        }

        tracing::info!(tab_id = %id, url = %url, "Reloading tab");
        self.arm_load_watchdog(id, generation);

        // The favicon is settled before the surface reloads
        if is_special_url(&url) {
            self.with_tab(id, |tab| tab.favicon = None);
        } else {
            self.fetch_favicon(id, &url, generation).await;
        }

        if let Err(e) = self
            .call(
                BackendCommand::NAVIGATE_SURFACE,
                self.backend.navigate_render_surface(id, &url),
            )
            .await
        {
            tracing::warn!(tab_id = %id, error = %e, "Reload failed");
            self.with_navigation(id, generation, |tab| tab.is_loading = false);
        }
    }

    // ==================== Audio & errors ====================

    pub async fn toggle_tab_audio(&self, id: &str) {
        let Some(muted) = self.find_tab(id).map(|tab| tab.is_audio_muted) else {
            return;
        };

        let result = if muted {
            self.call(
                BackendCommand::UNMUTE_SURFACE,
                self.backend.unmute_render_surface(id),
            )
            .await
        } else {
            self.call(
                BackendCommand::MUTE_SURFACE,
                self.backend.mute_render_surface(id),
            )
            .await
        };

        match result {
            Ok(()) => self.set_tab_audio_state(id, !muted),
            Err(e) => tracing::warn!(tab_id = %id, error = %e, "Failed to toggle tab audio"),
        }
    }

    pub fn set_tab_audio_state(&self, id: &str, muted: bool) {
        self.with_tab(id, |tab| tab.is_audio_muted = muted);
    }

    pub fn set_tab_has_audio(&self, id: &str, has_audio: bool) {
        self.with_tab(id, |tab| tab.set_has_audio(has_audio));
    }

    pub fn set_tab_error(&self, id: &str, message: &str) {
        if self.with_tab(id, |tab| tab.set_error(message)).is_some() {
            tracing::warn!(tab_id = %id, error = %message, "Tab failed to load");
        }
    }

    pub fn clear_tab_error(&self, id: &str) {
        self.with_tab(id, |tab| tab.clear_error());
    }

    // ==================== Backend events ====================

    /// Fold one backend notification into tab state
    pub async fn apply_event(&self, event: BackendEvent) {
        tracing::debug!(tab_id = %event.tab_id(), event = event.name(), "Backend event");

        match event {
            BackendEvent::UrlChanged { tab_id, url } => {
                let title = self.with_tab(&tab_id, |tab| {
                    tab.url = url.clone();
                    tab.push_history(&url);
                    tab.title.clone()
                });
                if let Some(title) = title {
                    if url != BLANK_URL {
                        self.history.record(&title, &url);
                    }
                }
            }
            BackendEvent::TitleChanged { tab_id, title } => {
                self.adopt_title(&tab_id, &decode_html_entities(&title), None);
            }
            BackendEvent::FaviconChanged { tab_id, favicon } => {
                self.with_tab(&tab_id, |tab| {
                    tab.favicon = favicon.filter(|f| !f.is_empty());
                    if tab.favicon.is_some() {
                        tab.is_loading = false;
                    }
                });
            }
            BackendEvent::SurfaceCreated {
                tab_id,
                url,
                title,
                surface,
            } => self.adopt_surface(tab_id, url, title, surface).await,
            BackendEvent::AudioChanged { tab_id, has_audio } => {
                self.set_tab_has_audio(&tab_id, has_audio);
            }
            BackendEvent::MuteChanged { tab_id, is_muted } => {
                self.set_tab_audio_state(&tab_id, is_muted);
            }
            BackendEvent::LoadError {
                tab_id,
                error_message,
            } => self.set_tab_error(&tab_id, &error_message),
        }
    }

    /// Register a tab whose surface the engine opened by itself
    async fn adopt_surface(&self, tab_id: String, url: String, title: String, surface: String) {
        let generation = {
            let mut state = self.state.write();
            if state.tabs.iter().any(|t| t.id == tab_id) {
                tracing::debug!(tab_id = %tab_id, "Surface already registered");
                return;
            }

            let mut tab = Tab::with_id(tab_id.clone(), url.clone(), title.clone());
            tab.surface = Some(surface);
            tab.is_loading = true;
            let generation = tab.begin_navigation();
            state.tabs.push(tab);
            generation
        };

        tracing::info!(tab_id = %tab_id, url = %url, "Adopted engine-created tab");

        if url != BLANK_URL {
            self.history.record(&title, &url);
        }
        self.arm_load_watchdog(&tab_id, generation);
        self.set_active_tab(&tab_id).await;
    }

    /// Apply the title-update policy. `generation` pins the candidate to one
    /// navigation attempt; event titles pass `None`.
    fn adopt_title(&self, id: &str, candidate: &str, generation: Option<u64>) -> bool {
        let adopted_url = self
            .with_tab(id, |tab| {
                if generation.is_some_and(|g| g != tab.navigation_generation) {
                    return None;
                }
                if !should_adopt_title(&tab.title, candidate, &tab.url) {
                    tracing::debug!(tab_id = %tab.id, current = %tab.title, candidate = %candidate, "Title update skipped");
                    return None;
                }

                tracing::debug!(tab_id = %tab.id, from = %tab.title, to = %candidate, "Title adopted");
                tab.title = candidate.to_string();
                tab.is_loading = false;
                Some(tab.url.clone())
            })
            .flatten();

        match adopted_url {
            Some(url) => {
                if !is_special_url(&url) {
                    self.history.update_title(&url, candidate);
                }
                true
            }
            None => false,
        }
    }

    // ==================== Accessors ====================

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.read().tabs.clone()
    }

    pub fn get_tab(&self, id: &str) -> Result<Tab> {
        self.find_tab(id)
            .ok_or_else(|| TabError::NotFound(id.to_string()))
    }

    pub fn find_tab(&self, id: &str) -> Option<Tab> {
        self.state.read().tabs.iter().find(|t| t.id == id).cloned()
    }

    pub fn active_tab(&self) -> Option<Tab> {
        let state = self.state.read();
        let id = state.active_tab_id.as_deref()?;
        state.tabs.iter().find(|t| t.id == id).cloned()
    }

    pub fn active_tab_id(&self) -> Option<String> {
        self.state.read().active_tab_id.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().tabs.is_empty()
    }

    pub fn can_go_back(&self, id: &str) -> bool {
        self.find_tab(id).is_some_and(|tab| tab.can_go_back())
    }

    pub fn can_go_forward(&self, id: &str) -> bool {
        self.find_tab(id).is_some_and(|tab| tab.can_go_forward())
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn backend(&self) -> &Arc<dyn RenderBackend> {
        &self.backend
    }

    pub fn config(&self) -> &TabsConfig {
        &self.config
    }

    /// Wait until every favicon and title fetch started so far has finished
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.tasks.lock());
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "Background tab task failed");
                }
            }
        }
    }

    // ==================== Internals ====================

    fn with_tab<R>(&self, id: &str, f: impl FnOnce(&mut Tab) -> R) -> Option<R> {
        self.state.write().tabs.iter_mut().find(|t| t.id == id).map(f)
    }

    /// Like [`Self::with_tab`], but only while `generation` is still the
    /// tab's current navigation
    fn with_navigation<R>(
        &self,
        id: &str,
        generation: u64,
        f: impl FnOnce(&mut Tab) -> R,
    ) -> Option<R> {
        self.with_tab(id, |tab| (tab.navigation_generation == generation).then(|| f(tab)))
            .flatten()
    }

    async fn call<T, F>(&self, command: &'static str, call: F) -> kestrel_backend::Result<T>
    where
        F: Future<Output = kestrel_backend::Result<T>>,
    {
        with_deadline(command, self.config.backend_timeout, call).await
    }

    /// Point the tab's surface at `url`, creating or dropping it as needed
    async fn route_surface(&self, id: &str, url: &str) {
        let Some(has_surface) = self.find_tab(id).map(|tab| tab.surface.is_some()) else {
            return;
        };

        if has_surface && url != BLANK_URL {
            let Err(e) = self
                .call(
                    BackendCommand::NAVIGATE_SURFACE,
                    self.backend.navigate_render_surface(id, url),
                )
                .await
            else {
                return;
            };

            tracing::warn!(tab_id = %id, url = %url, error = %e, "In-place navigation failed, recreating surface");

            let mut failures = 1;
            while self.config.retry.allows_retry(failures) {
                match self.recreate_surface(id, url).await {
                    Ok(()) => return,
                    Err(e) => {
                        tracing::warn!(tab_id = %id, attempt = failures, error = %e, "Surface recreation failed");
                        failures += 1;
                    }
                }
            }
            return;
        }

        if has_surface {
            match self
                .call(
                    BackendCommand::CLOSE_SURFACE,
                    self.backend.close_render_surface(id),
                )
                .await
            {
                Ok(()) => {
                    self.with_tab(id, |tab| tab.surface = None);
                }
                Err(e) => {
                    tracing::warn!(tab_id = %id, error = %e, "Failed to close old surface");
                }
            }
        }

        if url != BLANK_URL {
            if let Err(e) = self.attach_surface(id, url).await {
                tracing::warn!(tab_id = %id, url = %url, error = %e, "Surface creation failed");
            }
        }
    }

    async fn recreate_surface(&self, id: &str, url: &str) -> kestrel_backend::Result<()> {
        if let Err(e) = self
            .call(
                BackendCommand::CLOSE_SURFACE,
                self.backend.close_render_surface(id),
            )
            .await
        {
            tracing::warn!(tab_id = %id, error = %e, "Failed to close broken surface");
        }
        self.with_tab(id, |tab| tab.surface = None);

        self.attach_surface(id, url).await
    }

    /// Create a surface for the tab and show it if the tab is active
    async fn attach_surface(&self, id: &str, url: &str) -> kestrel_backend::Result<()> {
        let surface = self
            .call(
                BackendCommand::CREATE_SURFACE,
                self.backend.create_render_surface(id, url, LOADING_TITLE),
            )
            .await?;

        match self.with_tab(id, |tab| {
            tab.surface = Some(surface);
            tab.is_active
        }) {
            None => self.discard_surface(id).await,
            Some(true) => {
                if let Err(e) = self
                    .call(
                        BackendCommand::SHOW_SURFACE,
                        self.backend.show_render_surface(id),
                    )
                    .await
                {
                    tracing::warn!(tab_id = %id, error = %e, "Failed to show new surface");
                }
            }
            Some(false) => {}
        }
        Ok(())
    }

    /// Tear down a surface whose tab was closed while it was being created
    async fn discard_surface(&self, id: &str) {
        tracing::debug!(tab_id = %id, "Tab closed during surface creation");
        if let Err(e) = self
            .call(
                BackendCommand::CLOSE_SURFACE,
                self.backend.close_render_surface(id),
            )
            .await
        {
            tracing::warn!(tab_id = %id, error = %e, "Failed to close orphaned surface");
        }
    }

    fn refresh_favicon(&self, id: &str, url: &str, generation: u64) {
        let registry = self.clone();
        let tab_id = id.to_string();
        let url = url.to_string();

        self.spawn_tracked(async move {
            registry.fetch_favicon(&tab_id, &url, generation).await;
        });
    }

    /// Fetch the favicon and store it if the navigation is still current.
    /// A failed fetch clears it.
    async fn fetch_favicon(&self, id: &str, url: &str, generation: u64) {
        let result = self
            .call(BackendCommand::FETCH_FAVICON, self.backend.fetch_favicon(url))
            .await;

        match result {
            Ok(favicon) => {
                self.with_navigation(id, generation, |tab| tab.favicon = Some(favicon));
            }
            Err(e) => {
                tracing::warn!(tab_id = %id, url = %url, error = %e, "Failed to fetch favicon");
                self.with_navigation(id, generation, |tab| tab.favicon = None);
            }
        }
    }

    fn refresh_title(&self, id: &str, url: &str, generation: u64) {
        let registry = self.clone();
        let tab_id = id.to_string();
        let url = url.to_string();

        self.spawn_tracked(async move {
            let result = registry
                .call(
                    BackendCommand::FETCH_PAGE_TITLE,
                    registry.backend.fetch_page_title(&url),
                )
                .await;

            match result {
                Ok(title) => {
                    registry.adopt_title(&tab_id, &decode_html_entities(&title), Some(generation));
                }
                Err(e) => {
                    tracing::warn!(tab_id = %tab_id, url = %url, error = %e, "Failed to fetch page title");
                }
            }
        });
    }

    /// Force the tab idle if this navigation is still loading after the timeout
    fn arm_load_watchdog(&self, id: &str, generation: u64) {
        let registry = self.clone();
        let tab_id = id.to_string();
        let timeout = self.config.load_timeout;

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            let expired = registry.with_navigation(&tab_id, generation, |tab| {
                std::mem::replace(&mut tab.is_loading, false)
            });
            if expired == Some(true) {
                tracing::warn!(tab_id = %tab_id, timeout_ms = timeout.as_millis() as u64, "Load timed out, clearing loading state");
            }
        });
    }

    fn spawn_tracked<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut tasks = self.tasks.lock();
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }
}

impl Clone for TabRegistry {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            backend: Arc::clone(&self.backend),
            history: self.history.clone(),
            config: self.config.clone(),
            tasks: Arc::clone(&self.tasks),
        }
    }
}
