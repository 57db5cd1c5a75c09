use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::reminder::ReminderSettings;

use super::loader::ConfigLoader;

/// Longest accepted break interval
pub const MAX_INTERVAL_MINUTES: u64 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub blocking: BlockingConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub interval_minutes: u64,
    pub log_level: String,
    pub config_poll_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockingConfig {
    pub enabled: bool,
    // Bundle identifiers, e.g. "us.zoom.xos"
    #[serde(alias = "blocked_app_ids")]
    pub blocked_apps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub sound: Option<String>,
    pub notify_on_timeout: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 20,
            log_level: "info".to_string(),
            config_poll_seconds: 5,
        }
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            blocked_apps: vec!["us.zoom.xos".to_string(), "com.apple.Keynote".to_string()],
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: Some("Glass".to_string()),
            notify_on_timeout: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            blocking: BlockingConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::loader(config_path)?.load_config()
    }

    pub fn save(&self, config_path: Option<&str>) -> Result<()> {
        Self::loader(config_path)?.save_config(self)
    }

    /// Resolve the on-disk location, falling back to the default path
    pub fn resolve_path(config_path: Option<&str>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => ConfigLoader::default_config_path(),
        }
    }

    fn loader(
        config_path: Option<&str>,
    ) -> Result<ConfigLoader<crate::system::StandardFileSystem>> {
        Ok(ConfigLoader::new_production(Self::resolve_path(
            config_path,
        )?))
    }

    /// Reject values the timer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.general.interval_minutes == 0 {
            bail!("general.interval_minutes must be at least 1");
        }
        if self.general.interval_minutes > MAX_INTERVAL_MINUTES {
            bail!(
                "general.interval_minutes must be at most {} (one day)",
                MAX_INTERVAL_MINUTES
            );
        }
        if self.general.config_poll_seconds == 0 {
            bail!("general.config_poll_seconds must be at least 1");
        }
        if self.blocking.blocked_apps.iter().any(|id| id.trim().is_empty()) {
            bail!("blocking.blocked_apps must not contain empty identifiers");
        }
        Ok(())
    }

    /// Settings record handed to the reminder state machine
    pub fn reminder_settings(&self) -> ReminderSettings {
        ReminderSettings {
            interval_minutes: self.general.interval_minutes.max(1),
            blocking_enabled: self.blocking.enabled,
            blocked_app_ids: self
                .blocking
                .blocked_apps
                .iter()
                .map(|id| id.trim().to_string())
                .collect(),
        }
    }
}

impl From<&Config> for ReminderSettings {
    fn from(config: &Config) -> Self {
        config.reminder_settings()
    }
}
