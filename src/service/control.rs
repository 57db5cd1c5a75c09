use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::signals::SignalType;

/// PID file that lets CLI commands find the running daemon
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Result<PathBuf> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;
        Ok(home_dir.join(".local/share/break-reminder/daemon.pid"))
    }

    pub fn at_default_path() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Claim the PID file for this process.
    ///
    /// Fails if another live daemon already holds it; a file left behind by a
    /// dead process is overwritten.
    pub fn acquire(&self) -> Result<()> {
        if let Some(pid) = self.read()? {
            if pid != std::process::id() && is_process_alive(pid) {
                bail!("break-reminder daemon already running with PID {}", pid);
            }
            warn!("Removing stale PID file for process {}", pid);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create PID directory: {}", parent.display())
            })?;
        }

        std::fs::write(&self.path, std::process::id().to_string())
            .with_context(|| format!("Failed to write PID file: {}", self.path.display()))?;

        debug!("PID file written to {}", self.path.display());
        Ok(())
    }

    /// PID recorded in the file, or `None` if there is no file
    pub fn read(&self) -> Result<Option<u32>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read PID file: {}", self.path.display()))?;
        let pid = content
            .trim()
            .parse::<u32>()
            .with_context(|| format!("Malformed PID file: {}", self.path.display()))?;
        Ok(Some(pid))
    }

    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove PID file: {}", self.path.display()))?;
        }
        Ok(())
    }

    /// Ask the daemon recorded in this file to perform `action`
    pub fn signal_daemon(&self, action: SignalType) -> Result<u32> {
        let pid = self
            .read()?
            .ok_or_else(|| anyhow::anyhow!("break-reminder daemon is not running"))?;

        if !is_process_alive(pid) {
            bail!("break-reminder daemon (PID {}) is not running", pid);
        }

        send_signal(pid, action.as_raw())?;
        info!("Sent {:?} to daemon (PID {})", action, pid);
        Ok(pid)
    }
}

/// Deliver a raw signal to another process
pub fn send_signal(pid: u32, signal: i32) -> Result<()> {
    let pid = libc::pid_t::try_from(pid).context("PID out of range")?;

    // SAFETY: kill(2) has no memory-safety preconditions.
    let result = unsafe { libc::kill(pid, signal) };
    if result != 0 {
        return Err(std::io::Error::last_os_error())
            .with_context(|| format!("Failed to send signal {} to PID {}", signal, pid));
    }
    Ok(())
}

/// True if a process with `pid` exists
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };

    // SAFETY: signal 0 only performs the existence and permission check.
    let result = unsafe { libc::kill(pid, 0) };
    if result == 0 {
        return true;
    }
    // EPERM means the process exists but belongs to someone else
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_writes_own_pid() {
        let dir = TempDir::new().unwrap();
        let pid_file = PidFile::new(dir.path().join("run/daemon.pid"));

        pid_file.acquire().unwrap();

        assert_eq!(pid_file.read().unwrap(), Some(std::process::id()));
        pid_file.remove().unwrap();
        assert_eq!(pid_file.read().unwrap(), None);
    }

    #[test]
    fn test_acquire_twice_from_same_process() {
        let dir = TempDir::new().unwrap();
        let pid_file = PidFile::new(dir.path().join("daemon.pid"));
        pid_file.acquire().unwrap();
        pid_file.acquire().unwrap();
    }

    #[test]
    fn test_malformed_pid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daemon.pid");
        std::fs::write(&path, "not-a-pid").unwrap();

        assert!(PidFile::new(path).read().is_err());
    }

    #[test]
    fn test_signal_without_daemon_fails() {
        let dir = TempDir::new().unwrap();
        let pid_file = PidFile::new(dir.path().join("daemon.pid"));
        let err = pid_file.signal_daemon(SignalType::Dismiss).unwrap_err();
        assert!(err.to_string().contains("not running"));
    }

    #[test]
    fn test_current_process_is_alive() {
        assert!(is_process_alive(std::process::id()));
    }
}
