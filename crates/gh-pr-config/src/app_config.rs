//! Application configuration
//!
//! Configuration loaded from .gh-pr-tray.toml file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// OAuth app registered for the tray
pub const DEFAULT_CLIENT_ID: &str = "Ov23liJtErJem2rhR36t";

/// Application configuration loaded from .gh-pr-tray.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// OAuth client id used for the device flow
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// OAuth scopes requested during setup
    #[serde(default = "default_scope")]
    pub scope: String,

    /// REST API root
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Web host serving the device flow endpoints
    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Seconds between two scheduled refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Seconds to wait after a failed listing before giving up the cycle
    #[serde(default = "default_fetch_error_cooldown_secs")]
    pub fetch_error_cooldown_secs: u64,

    /// Delay between two processed notifications, in milliseconds
    #[serde(default = "default_notification_pacing_ms")]
    pub notification_pacing_ms: u64,

    /// Seconds between two access token polls
    #[serde(default = "default_device_poll_interval_secs")]
    pub device_poll_interval_secs: u64,

    /// Give up the device flow after this many seconds of polling
    #[serde(default = "default_device_poll_timeout_secs")]
    pub device_poll_timeout_secs: u64,
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

fn default_scope() -> String {
    "notifications repo".to_string()
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_oauth_base_url() -> String {
    "https://github.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_refresh_interval_secs() -> u64 {
    10 * 60
}

fn default_fetch_error_cooldown_secs() -> u64 {
    35
}

fn default_notification_pacing_ms() -> u64 {
    1000
}

fn default_device_poll_interval_secs() -> u64 {
    10
}

fn default_device_poll_timeout_secs() -> u64 {
    15 * 60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            scope: default_scope(),
            api_base_url: default_api_base_url(),
            oauth_base_url: default_oauth_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            fetch_error_cooldown_secs: default_fetch_error_cooldown_secs(),
            notification_pacing_ms: default_notification_pacing_ms(),
            device_poll_interval_secs: default_device_poll_interval_secs(),
            device_poll_timeout_secs: default_device_poll_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        Self::load_from(None)
    }

    /// Load config from an explicit path, or search the usual locations
    pub fn load_from(explicit: Option<&Path>) -> Self {
        if let Some(content) = crate::load_config_file(explicit) {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded app config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default app config");
        Self::default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn fetch_error_cooldown(&self) -> Duration {
        Duration::from_secs(self.fetch_error_cooldown_secs)
    }

    pub fn notification_pacing(&self) -> Duration {
        Duration::from_millis(self.notification_pacing_ms)
    }

    pub fn device_poll_interval(&self) -> Duration {
        Duration::from_secs(self.device_poll_interval_secs)
    }

    pub fn device_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.device_poll_timeout_secs)
    }
}
