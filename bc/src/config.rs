//! bizconsult configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::conversation::DEFAULT_HISTORY_WINDOW;

/// Main bizconsult configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service base URLs
    pub endpoints: EndpointsConfig,

    /// HTTP transport settings
    pub http: HttpConfig,

    /// Conversation settings
    pub conversation: ConversationConfig,

    /// Report lifecycle settings
    pub reports: ReportsConfig,

    /// Local storage settings
    pub storage: StorageConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        let endpoints = [
            ("api-base-url", &self.endpoints.api_base_url),
            ("chat-api-url", &self.endpoints.chat_api_url),
            ("task-api-url", &self.endpoints.task_api_url),
            ("identity-api-url", &self.endpoints.identity_api_url),
        ];
        for (name, url) in endpoints {
            if url.trim().is_empty() {
                return Err(eyre::eyre!("Endpoint {} is not configured", name));
            }
        }
        let window = self.conversation.history_window;
        if !(1..=DEFAULT_HISTORY_WINDOW).contains(&window) {
            return Err(eyre::eyre!(
                "conversation.history-window must be between 1 and {}, got {}",
                DEFAULT_HISTORY_WINDOW,
                window
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.endpoints.apply_env();
        Ok(config)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .bizconsult.yml
        let local_config = PathBuf::from(".bizconsult.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/bizconsult/bizconsult.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("bizconsult").join("bizconsult.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Base URLs of the external services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Report storage and tag identification
    #[serde(rename = "api-base-url")]
    pub api_base_url: String,

    /// Advisory (chat) service
    #[serde(rename = "chat-api-url")]
    pub chat_api_url: String,

    /// Task publishing service
    #[serde(rename = "task-api-url")]
    pub task_api_url: String,

    /// Task center web UI, used to link created tasks
    #[serde(rename = "task-ui-url")]
    pub task_ui_url: String,

    /// Identity service (project listing)
    #[serde(rename = "identity-api-url")]
    pub identity_api_url: String,
}

impl EndpointsConfig {
    /// Override base URLs from `BIZC_*` environment variables
    fn apply_env(&mut self) {
        let overrides = [
            ("BIZC_API_BASE_URL", &mut self.api_base_url),
            ("BIZC_CHAT_API_URL", &mut self.chat_api_url),
            ("BIZC_TASK_API_URL", &mut self.task_api_url),
            ("BIZC_TASK_UI_URL", &mut self.task_ui_url),
            ("BIZC_IDENTITY_API_URL", &mut self.identity_api_url),
        ];
        for (var, target) in overrides {
            if let Ok(value) = std::env::var(var)
                && !value.trim().is_empty()
            {
                tracing::debug!(%var, "apply_env: override");
                *target = value;
            }
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            chat_api_url: "http://localhost:3000/chat".to_string(),
            task_api_url: "http://localhost:3001/api".to_string(),
            task_ui_url: "http://localhost:3001".to_string(),
            identity_api_url: "http://localhost:3002".to_string(),
        }
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout for report, tag, task and project requests in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Timeout for the advisory service in milliseconds
    #[serde(rename = "chat-timeout-ms")]
    pub chat_timeout_ms: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_millis(self.chat_timeout_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            chat_timeout_ms: 120_000,
        }
    }
}

/// Conversation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Number of most recent messages sent with each turn
    #[serde(rename = "history-window")]
    pub history_window: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }
}

/// Report lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Delay before reloading a report after a publish, in milliseconds
    #[serde(rename = "reload-delay-ms")]
    pub reload_delay_ms: u64,
}

impl ReportsConfig {
    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self { reload_delay_ms: 1000 }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the session key-value store
    #[serde(rename = "session-dir")]
    pub session_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            session_dir: sessionstore::FileStore::default_path(),
        }
    }
}
