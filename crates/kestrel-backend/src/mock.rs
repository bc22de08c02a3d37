//! Scriptable in-memory backend for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::BackendError;
use crate::surface::{BackendCommand, RenderBackend, SurfaceHandle};
use crate::Result;

#[derive(Default)]
struct MockState {
    commands: Vec<BackendCommand>,
    /// Remaining failures per command; `None` fails forever
    failures: HashMap<&'static str, Option<u32>>,
    delays: HashMap<&'static str, Duration>,
    favicons: HashMap<String, String>,
    titles: HashMap<String, String>,
}

/// Records every command it receives and answers from a script.
///
/// Unscripted favicon and title lookups fail with [`BackendError::NotFound`].
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future call of `command` fail
    pub fn fail(&self, command: &'static str) {
        self.state.lock().failures.insert(command, None);
    }

    /// Make the next `times` calls of `command` fail
    pub fn fail_times(&self, command: &'static str, times: u32) {
        self.state.lock().failures.insert(command, Some(times));
    }

    pub fn recover(&self, command: &'static str) {
        self.state.lock().failures.remove(command);
    }

    /// Hold every call of `command` for `delay` before answering
    pub fn delay(&self, command: &'static str, delay: Duration) {
        self.state.lock().delays.insert(command, delay);
    }

    pub fn set_favicon(&self, url: &str, data_url: &str) {
        self.state
            .lock()
            .favicons
            .insert(url.to_string(), data_url.to_string());
    }

    pub fn set_title(&self, url: &str, title: &str) {
        self.state
            .lock()
            .titles
            .insert(url.to_string(), title.to_string());
    }

    pub fn commands(&self) -> Vec<BackendCommand> {
        self.state.lock().commands.clone()
    }

    pub fn count(&self, command: &'static str) -> usize {
        self.state
            .lock()
            .commands
            .iter()
            .filter(|cmd| cmd.name() == command)
            .count()
    }

    pub fn clear_commands(&self) {
        self.state.lock().commands.clear();
    }

    async fn record(&self, command: BackendCommand) -> Result<()> {
        let name = command.name();
        let (failed, delay) = {
            let mut state = self.state.lock();
            state.commands.push(command);

            let failed = match state.failures.get_mut(name) {
                Some(None) => true,
                Some(Some(remaining)) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            };
            (failed, state.delays.get(name).copied())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if failed {
            Err(BackendError::command(name, "scripted failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RenderBackend for MockBackend {
    async fn create_render_surface(
        &self,
        tab_id: &str,
        url: &str,
        _title: &str,
    ) -> Result<SurfaceHandle> {
        self.record(BackendCommand::CreateSurface {
            tab_id: tab_id.to_string(),
            url: url.to_string(),
        })
        .await?;
        Ok(format!("surface-{}", tab_id))
    }

    async fn show_render_surface(&self, tab_id: &str) -> Result<()> {
        self.record(BackendCommand::ShowSurface {
            tab_id: tab_id.to_string(),
        })
        .await
    }

    async fn hide_all_render_surfaces(&self) -> Result<()> {
        self.record(BackendCommand::HideAllSurfaces).await
    }

    async fn close_render_surface(&self, tab_id: &str) -> Result<()> {
        self.record(BackendCommand::CloseSurface {
            tab_id: tab_id.to_string(),
        })
        .await
    }

    async fn navigate_render_surface(&self, tab_id: &str, url: &str) -> Result<()> {
        self.record(BackendCommand::NavigateSurface {
            tab_id: tab_id.to_string(),
            url: url.to_string(),
        })
        .await
    }

    async fn fetch_favicon(&self, url: &str) -> Result<String> {
        self.record(BackendCommand::FetchFavicon {
            url: url.to_string(),
        })
        .await?;
        self.state
            .lock()
            .favicons
            .get(url)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("favicon for {}", url)))
    }

    async fn fetch_page_title(&self, url: &str) -> Result<String> {
        self.record(BackendCommand::FetchPageTitle {
            url: url.to_string(),
        })
        .await?;
        self.state
            .lock()
            .titles
            .get(url)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("title for {}", url)))
    }

    async fn mute_render_surface(&self, tab_id: &str) -> Result<()> {
        self.record(BackendCommand::MuteSurface {
            tab_id: tab_id.to_string(),
        })
        .await
    }

    async fn unmute_render_surface(&self, tab_id: &str) -> Result<()> {
        self.record(BackendCommand::UnmuteSurface {
            tab_id: tab_id.to_string(),
        })
        .await
    }

    async fn open_new_window(&self) -> Result<()> {
        self.record(BackendCommand::OpenNewWindow).await
    }

    async fn close_current_window(&self) -> Result<()> {
        self.record(BackendCommand::CloseCurrentWindow).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_fails_on_script() {
        let backend = MockBackend::new();
        backend.fail_times(BackendCommand::NAVIGATE_SURFACE, 1);

        assert!(backend.navigate_render_surface("t1", "https://a.test").await.is_err());
        assert!(backend.navigate_render_surface("t1", "https://b.test").await.is_ok());
        assert_eq!(backend.count(BackendCommand::NAVIGATE_SURFACE), 2);

        let handle = backend
            .create_render_surface("t1", "https://a.test", "Loading...")
            .await
            .unwrap();
        assert_eq!(handle, "surface-t1");
    }

    #[tokio::test]
    async fn test_unscripted_metadata_fails() {
        let backend = MockBackend::new();
        assert!(backend.fetch_favicon("https://a.test").await.is_err());

        backend.set_title("https://a.test", "A Test Page");
        assert_eq!(
            backend.fetch_page_title("https://a.test").await.unwrap(),
            "A Test Page"
        );
    }
}
