use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use crate::reminder::{DismissReason, ReminderEvent, ReminderListener};
use crate::system::traits::{FileSystemInterface, ForegroundAppInterface};

/// Mock foreground app query for testing - provides a controllable frontmost app
#[derive(Clone)]
pub struct MockForegroundApp {
    pub frontmost: Arc<Mutex<Option<String>>>,
    pub query_count: Arc<AtomicUsize>,
    pub should_fail: Arc<AtomicBool>,
}

impl MockForegroundApp {
    pub fn new() -> Self {
        Self {
            frontmost: Arc::new(Mutex::new(None)),
            query_count: Arc::new(AtomicUsize::new(0)),
            should_fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a mock with `app_id` already in front
    pub fn with_frontmost(app_id: &str) -> Self {
        let mock = Self::new();
        mock.set_frontmost(Some(app_id));
        mock
    }

    /// Bring an application to the front, or clear it with `None`
    pub fn set_frontmost(&self, app_id: Option<&str>) {
        *self.frontmost.lock().unwrap() = app_id.map(str::to_string);
    }

    /// Number of times the frontmost app was queried
    pub fn get_query_count(&self) -> usize {
        self.query_count.load(Ordering::Relaxed)
    }

    /// Configure the mock to fail queries
    pub fn set_query_failure(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::Relaxed);
    }
}

impl ForegroundAppInterface for MockForegroundApp {
    fn frontmost_app_id(&self) -> Result<Option<String>> {
        self.query_count.fetch_add(1, Ordering::Relaxed);

        if self.should_fail.load(Ordering::Relaxed) {
            return Err(anyhow::anyhow!("Mock frontmost query failure"));
        }

        Ok(self.frontmost.lock().unwrap().clone())
    }
}

impl Default for MockForegroundApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener that records every event it receives
#[derive(Clone, Default)]
pub struct RecordingListener {
    pub events: Arc<Mutex<Vec<ReminderEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded events in order
    pub fn get_events(&self) -> Vec<ReminderEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Count recorded events equal to `event`
    pub fn count(&self, event: &ReminderEvent) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| *e == event)
            .count()
    }

    /// Number of reminders shown so far
    pub fn shown_count(&self) -> usize {
        self.count(&ReminderEvent::ReminderShown)
    }

    /// Most recent event, if any
    pub fn last_event(&self) -> Option<ReminderEvent> {
        self.events.lock().unwrap().last().cloned()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: ReminderEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ReminderListener for RecordingListener {
    fn on_tick(&self, remaining_seconds: u64) {
        self.record(ReminderEvent::Tick(remaining_seconds));
    }

    fn on_reminder_shown(&self) {
        self.record(ReminderEvent::ReminderShown);
    }

    fn on_reminder_dismissed(&self, reason: DismissReason) {
        self.record(ReminderEvent::ReminderDismissed(reason));
    }

    fn on_reminder_timeout_tick(&self, remaining_seconds: u64) {
        self.record(ReminderEvent::ReminderTimeoutTick(remaining_seconds));
    }

    fn on_suppressed(&self, app_id: &str) {
        self.record(ReminderEvent::Suppressed(app_id.to_string()));
    }

    fn on_paused(&self) {
        self.record(ReminderEvent::Paused);
    }

    fn on_resumed(&self) {
        self.record(ReminderEvent::Resumed);
    }

    fn on_stopped(&self) {
        self.record(ReminderEvent::Stopped);
    }
}

/// Mock file system for testing - provides controllable file operations
#[derive(Clone)]
pub struct MockFileSystem {
    pub files: Arc<Mutex<HashMap<PathBuf, String>>>,
    pub modified_times: Arc<Mutex<HashMap<PathBuf, SystemTime>>>,
    pub read_calls: Arc<Mutex<Vec<PathBuf>>>,
    pub write_calls: Arc<Mutex<Vec<(PathBuf, String)>>>,
    pub directory_creation_calls: Arc<Mutex<Vec<PathBuf>>>,
    pub should_fail_read: Arc<Mutex<bool>>,
    pub should_fail_write: Arc<Mutex<bool>>,
    pub should_fail_create_dir: Arc<Mutex<bool>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            modified_times: Arc::new(Mutex::new(HashMap::new())),
            read_calls: Arc::new(Mutex::new(Vec::new())),
            write_calls: Arc::new(Mutex::new(Vec::new())),
            directory_creation_calls: Arc::new(Mutex::new(Vec::new())),
            should_fail_read: Arc::new(Mutex::new(false)),
            should_fail_write: Arc::new(Mutex::new(false)),
            should_fail_create_dir: Arc::new(Mutex::new(false)),
        }
    }

    /// Add a file to the mock file system
    pub fn add_file<P: AsRef<Path>>(&self, path: P, content: String) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content);
    }

    /// Remove a file from the mock file system
    pub fn remove_file<P: AsRef<Path>>(&self, path: P) {
        self.files.lock().unwrap().remove(path.as_ref());
    }

    /// Override the modification time reported for a file
    pub fn set_modified_time<P: AsRef<Path>>(&self, path: P, modified: SystemTime) {
        self.modified_times
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), modified);
    }

    /// Get all read calls that were made
    pub fn get_read_calls(&self) -> Vec<PathBuf> {
        self.read_calls.lock().unwrap().clone()
    }

    /// Get all write calls that were made
    pub fn get_write_calls(&self) -> Vec<(PathBuf, String)> {
        self.write_calls.lock().unwrap().clone()
    }

    /// Get all directory creation calls that were made
    pub fn get_directory_creation_calls(&self) -> Vec<PathBuf> {
        self.directory_creation_calls.lock().unwrap().clone()
    }

    /// Clear all call histories
    pub fn clear_call_history(&self) {
        self.read_calls.lock().unwrap().clear();
        self.write_calls.lock().unwrap().clear();
        self.directory_creation_calls.lock().unwrap().clear();
    }

    /// Configure the mock to fail read operations
    pub fn set_read_failure(&self, should_fail: bool) {
        *self.should_fail_read.lock().unwrap() = should_fail;
    }

    /// Configure the mock to fail write operations
    pub fn set_write_failure(&self, should_fail: bool) {
        *self.should_fail_write.lock().unwrap() = should_fail;
    }

    /// Configure the mock to fail directory creation
    pub fn set_create_dir_failure(&self, should_fail: bool) {
        *self.should_fail_create_dir.lock().unwrap() = should_fail;
    }

    /// Check if a file exists in the mock system
    pub fn file_exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.lock().unwrap().contains_key(path.as_ref())
    }
}

impl FileSystemInterface for MockFileSystem {
    fn read_config_file(&self, path: &Path) -> Result<String> {
        self.read_calls.lock().unwrap().push(path.to_path_buf());

        if *self.should_fail_read.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock read failure"));
        }

        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("File not found: {}", path.display()))
    }

    fn write_config_file(&self, path: &Path, content: &str) -> Result<()> {
        self.write_calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), content.to_string()));

        if *self.should_fail_write.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock write failure"));
        }

        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn config_file_exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn create_config_dir(&self, path: &Path) -> Result<()> {
        self.directory_creation_calls
            .lock()
            .unwrap()
            .push(path.to_path_buf());

        if *self.should_fail_create_dir.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock create directory failure"));
        }

        Ok(())
    }

    fn get_config_modified_time(&self, path: &Path) -> Result<SystemTime> {
        if !self.config_file_exists(path) {
            return Err(anyhow::anyhow!("File not found: {}", path.display()));
        }

        // Fixed time unless a test overrides it
        Ok(self
            .modified_times
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(SystemTime::UNIX_EPOCH + Duration::from_secs(1000)))
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}
