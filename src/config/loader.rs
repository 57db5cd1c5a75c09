use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::system::{FileSystemInterface, StandardFileSystem};

use super::types::Config;

/// Reads and writes the reminder's TOML file through a [`FileSystemInterface`]
pub struct ConfigLoader<F: FileSystemInterface> {
    file_system: F,
    config_path: PathBuf,
}

impl<F: FileSystemInterface> ConfigLoader<F> {
    pub fn new(file_system: F, config_path: PathBuf) -> Self {
        Self {
            file_system,
            config_path,
        }
    }

    /// Parsed and validated config.
    ///
    /// A missing file yields the defaults, written back to disk when possible.
    pub fn load_config(&self) -> Result<Config> {
        let path = &self.config_path;
        debug!("Reading break reminder config at {}", path.display());

        if !self.config_exists() {
            info!("No config at {}, falling back to defaults", path.display());
            return Ok(self.write_defaults());
        }

        let raw = self
            .file_system
            .read_config_file(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        debug!(
            "Config ok: every {} min, {} blocked apps",
            config.general.interval_minutes,
            config.blocking.blocked_apps.len()
        );
        Ok(config)
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        let path = &self.config_path;
        let rendered =
            toml::to_string_pretty(config).context("Failed to serialize configuration")?;

        if let Some(dir) = path.parent() {
            self.file_system
                .create_config_dir(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }
        self.file_system
            .write_config_file(path, &rendered)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        info!("Wrote break reminder config to {}", path.display());
        Ok(())
    }

    /// Same as [`load_config`](Self::load_config); called on SIGHUP and on file changes
    pub fn reload_config(&self) -> Result<Config> {
        debug!("Re-reading config after a change");
        self.load_config()
    }

    /// Modification time of the config file, if it exists
    pub fn modified_time(&self) -> Option<SystemTime> {
        if !self.config_exists() {
            return None;
        }
        self.file_system
            .get_config_modified_time(&self.config_path)
            .ok()
    }

    /// Whether the file on disk is newer than `since`. A missing file never is.
    pub fn is_config_modified(&self, since: SystemTime) -> Result<bool> {
        if !self.config_exists() {
            return Ok(false);
        }
        let modified = self
            .file_system
            .get_config_modified_time(&self.config_path)?;
        Ok(modified > since)
    }

    pub fn config_exists(&self) -> bool {
        self.file_system.config_file_exists(&self.config_path)
    }

    /// Defaults, persisted on a best-effort basis. Read-only locations still run.
    fn write_defaults(&self) -> Config {
        let config = Config::default();
        match self.save_config(&config) {
            Ok(()) => info!(
                "Created default configuration file: {}",
                self.config_path.display()
            ),
            Err(e) => warn!("Running on built-in defaults, config not saved: {:#}", e),
        }
        config
    }
}

impl ConfigLoader<StandardFileSystem> {
    pub fn new_production(config_path: PathBuf) -> Self {
        Self::new(StandardFileSystem, config_path)
    }

    /// `~/.config/break-reminder/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".config").join("break-reminder").join("config.toml"))
    }
}
