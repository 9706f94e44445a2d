//! Configuration loading and management

mod io;
mod settings;

pub use settings::{ApiSettings, StorageSettings, DEFAULT_BASE_URL};

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable that overrides `[api] base_url`.
pub const API_URL_ENV: &str = "CREATEATHON_API_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Where client state (tokens, bookmarks, timers) is kept
    #[serde(default)]
    pub storage: StorageSettings,
}

impl Config {
    /// Base URL after applying overrides: `flag`, then the environment, then the file.
    pub fn base_url(&self, flag: Option<&str>) -> String {
        let env = std::env::var(API_URL_ENV).ok();
        self.base_url_with(flag, env.as_deref())
    }

    fn base_url_with(&self, flag: Option<&str>, env: Option<&str>) -> String {
        flag.or(env)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.api.base_url)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.api.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.api.read_timeout_secs)
    }

    /// Directory holding `state.json`; defaults to the global config directory.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::global_config_dir)
    }
}
