//! Configuration loading and management
//!
//! Handles parsing of `config.toml` in the data directory.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assignment::ReminderKind;
use crate::storage::CONFIG_FILE;

const MAX_POLL_INTERVAL_SECS: u64 = 3600;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminders: ReminderConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Reminder evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Seconds between reminder evaluations
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Reminder kinds preselected for new assignments
    #[serde(default = "default_kinds")]
    pub default_kinds: Vec<String>,
}

fn default_poll_interval_secs() -> u64 {
    15
}

fn default_kinds() -> Vec<String> {
    vec![ReminderKind::AtDueDate.as_str().to_string()]
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            default_kinds: default_kinds(),
        }
    }
}

impl ReminderConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Parsed default kinds; unknown entries are rejected by `validate`.
    pub fn default_reminders(&self) -> BTreeSet<ReminderKind> {
        self.default_kinds
            .iter()
            .filter_map(|kind| kind.parse().ok())
            .collect()
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "reminders.poll_interval_secs must be > 0".to_string(),
            ));
        }
        if self.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            return Err(crate::error::Error::InvalidConfig(format!(
                "reminders.poll_interval_secs must be <= {MAX_POLL_INTERVAL_SECS}"
            )));
        }
        for kind in &self.default_kinds {
            kind.parse::<ReminderKind>().map_err(|_| {
                crate::error::Error::InvalidConfig(format!(
                    "reminders.default_kinds: unknown kind '{kind}'"
                ))
            })?;
        }
        Ok(())
    }
}

/// Notification delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Delivery backend: desktop or terminal
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Icon name or path passed to the desktop backend
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Application name shown by the notification daemon
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

fn default_backend() -> String {
    "desktop".to_string()
}

fn default_icon() -> String {
    "appointment-soon".to_string()
}

fn default_app_name() -> String {
    "AssignMate".to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            icon: default_icon(),
            app_name: default_app_name(),
        }
    }
}

impl NotificationConfig {
    fn validate(&self) -> crate::error::Result<()> {
        match self.backend.as_str() {
            "desktop" | "terminal" => Ok(()),
            other => Err(crate::error::Error::InvalidConfig(format!(
                "notifications.backend: invalid backend '{other}' (expected desktop|terminal)"
            ))),
        }
    }
}

/// Display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Theme used when none has been saved: system, dark or light
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    "system".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}

impl DisplayConfig {
    fn validate(&self) -> crate::error::Result<()> {
        match self.theme.as_str() {
            "system" | "dark" | "light" => Ok(()),
            other => Err(crate::error::Error::InvalidConfig(format!(
                "display.theme: invalid theme '{other}' (expected system|dark|light)"
            ))),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from the data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> Self {
        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.reminders.validate()?;
        self.notifications.validate()?;
        self.display.validate()?;
        Ok(())
    }
}
