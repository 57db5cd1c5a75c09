use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::system::traits::{FileSystemInterface, ForegroundAppInterface};

const FRONTMOST_APP_SCRIPT: &str = r#"tell application "System Events" to get bundle identifier of first application process whose frontmost is true"#;

/// Production implementation of ForegroundAppInterface using osascript
pub struct MacOSForegroundApp;

impl MacOSForegroundApp {
    pub fn new() -> Self {
        Self
    }
}

impl ForegroundAppInterface for MacOSForegroundApp {
    fn frontmost_app_id(&self) -> Result<Option<String>> {
        let output = Command::new("osascript")
            .args(["-e", FRONTMOST_APP_SCRIPT])
            .output()
            .context("Failed to run osascript")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::anyhow!(
                "osascript frontmost query failed: {}",
                stderr.trim()
            ));
        }

        let app_id = parse_bundle_id(&String::from_utf8_lossy(&output.stdout));
        debug!("Frontmost application: {:?}", app_id);
        Ok(app_id)
    }
}

/// osascript prints `missing value` when the process has no bundle
fn parse_bundle_id(stdout: &str) -> Option<String> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() || trimmed == "missing value" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Production implementation of FileSystemInterface using std::fs
pub struct StandardFileSystem;

impl FileSystemInterface for StandardFileSystem {
    fn read_config_file(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))
    }

    fn write_config_file(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write config file: {}", e))
    }

    fn config_file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_config_dir(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .map_err(|e| anyhow::anyhow!("Failed to create config directory: {}", e))
    }

    fn get_config_modified_time(&self, path: &Path) -> Result<std::time::SystemTime> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| anyhow::anyhow!("Failed to get file metadata: {}", e))?;
        metadata
            .modified()
            .map_err(|e| anyhow::anyhow!("Failed to get modified time: {}", e))
    }
}

impl Default for MacOSForegroundApp {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for StandardFileSystem {
    fn default() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bundle_id() {
        assert_eq!(
            parse_bundle_id("com.apple.Safari\n"),
            Some("com.apple.Safari".to_string())
        );
        assert_eq!(parse_bundle_id("missing value\n"), None);
        assert_eq!(parse_bundle_id("   \n"), None);
    }
}
