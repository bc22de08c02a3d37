//! Browser configuration

use kestrel_backend::SurfaceRetryPolicy;
use kestrel_navigation::{DEFAULT_HISTORY_CAPACITY, DEFAULT_SEARCH_TEMPLATE};
use kestrel_tabs::TabsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Homepage URL
    pub homepage: String,
    /// Search engine URL template (%s replaced with query)
    pub search_engine: String,
    /// Maximum number of global history entries
    pub history_capacity: usize,
    /// Milliseconds before a stuck navigation is forced idle
    pub load_timeout_ms: u64,
    /// Milliseconds any single render backend command may take
    pub backend_timeout_ms: u64,
    /// Start with the Google and GitHub bookmarks
    pub seed_default_bookmarks: bool,
}

impl Config {
    /// Load configuration from a JSON file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;

        tracing::info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.search_engine.contains("%s") {
            return Err(CoreError::Config(format!(
                "search_engine must contain %s: {}",
                self.search_engine
            )));
        }
        if self.homepage.trim().is_empty() {
            return Err(CoreError::Config("homepage cannot be empty".to_string()));
        }
        if self.history_capacity == 0 {
            return Err(CoreError::Config(
                "history_capacity must be positive".to_string(),
            ));
        }
        if self.load_timeout_ms == 0 || self.backend_timeout_ms == 0 {
            return Err(CoreError::Config("timeouts must be positive".to_string()));
        }
        Ok(())
    }

    /// The tab registry's slice of the configuration
    pub fn tabs_config(&self) -> TabsConfig {
        TabsConfig {
            load_timeout: Duration::from_millis(self.load_timeout_ms),
            backend_timeout: Duration::from_millis(self.backend_timeout_ms),
            retry: SurfaceRetryPolicy::default(),
            history_capacity: self.history_capacity,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Kestrel"))
            .unwrap_or_else(|| PathBuf::from(".kestrel"))
    }

    pub fn default_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            homepage: "https://www.google.com".to_string(),
            search_engine: DEFAULT_SEARCH_TEMPLATE.to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            load_timeout_ms: 15_000,
            backend_timeout_ms: 10_000,
            seed_default_bookmarks: true,
        }
    }
}

// Platform data directory lookup
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("kestrel-config-{}-{}", std::process::id(), name))
            .join("config.json")
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.homepage, "https://www.google.com");
        assert_eq!(config.history_capacity, 1000);
        assert!(config.validate().is_ok());

        let tabs = config.tabs_config();
        assert_eq!(tabs.load_timeout, Duration::from_secs(15));
        assert_eq!(tabs.backend_timeout, Duration::from_secs(10));
        assert_eq!(tabs.retry.max_retries, 1);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(temp_path("missing")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("partial");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"homepage": "https://example.com"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.homepage, "https://example.com");
        assert_eq!(config.load_timeout_ms, 15_000);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_path("saved");
        let config = Config {
            search_engine: "https://duckduckgo.com/?q=%s".to_string(),
            seed_default_bookmarks: false,
            ..Config::default()
        };
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let path = temp_path("invalid");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"search_engine": "https://example.com/"}"#).unwrap();
        assert!(matches!(Config::load(&path), Err(CoreError::Config(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load(&path), Err(CoreError::Serialization(_))));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
