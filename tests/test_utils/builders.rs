//! Builders for settings, configurations and timers used across the
//! integration tests.
//!
//! Not every test uses every method, so dead code warnings are suppressed.

#![allow(dead_code)]

use break_reminder::config::Config;
use break_reminder::reminder::{ReminderSettings, ReminderTimer};
use break_reminder::system::{MockForegroundApp, RecordingListener};

/// Builder for [`ReminderSettings`]
pub struct ReminderSettingsBuilder {
    interval_minutes: u64,
    blocking_enabled: bool,
    blocked_apps: Vec<String>,
}

impl ReminderSettingsBuilder {
    pub fn new() -> Self {
        Self {
            interval_minutes: 1,
            blocking_enabled: false,
            blocked_apps: Vec::new(),
        }
    }

    pub fn interval_minutes(mut self, minutes: u64) -> Self {
        self.interval_minutes = minutes;
        self
    }

    pub fn block(mut self, app_id: &str) -> Self {
        self.blocking_enabled = true;
        self.blocked_apps.push(app_id.to_string());
        self
    }

    pub fn blocking_enabled(mut self, enabled: bool) -> Self {
        self.blocking_enabled = enabled;
        self
    }

    pub fn build(self) -> ReminderSettings {
        ReminderSettings::new(self.interval_minutes)
            .with_blocked_apps(self.blocked_apps)
            .with_blocking_enabled(self.blocking_enabled)
    }
}

impl Default for ReminderSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for TOML configuration files
pub struct ConfigBuilder {
    interval_minutes: u64,
    log_level: String,
    config_poll_seconds: u64,
    blocking_enabled: bool,
    blocked_apps: Vec<String>,
    notifications_enabled: bool,
    notify_on_timeout: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            interval_minutes: 20,
            log_level: "info".to_string(),
            config_poll_seconds: 5,
            blocking_enabled: false,
            blocked_apps: Vec::new(),
            notifications_enabled: true,
            notify_on_timeout: false,
        }
    }

    pub fn interval_minutes(mut self, minutes: u64) -> Self {
        self.interval_minutes = minutes;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    pub fn config_poll_seconds(mut self, seconds: u64) -> Self {
        self.config_poll_seconds = seconds;
        self
    }

    pub fn block(mut self, app_id: &str) -> Self {
        self.blocking_enabled = true;
        self.blocked_apps.push(app_id.to_string());
        self
    }

    pub fn blocking_enabled(mut self, enabled: bool) -> Self {
        self.blocking_enabled = enabled;
        self
    }

    pub fn notifications_enabled(mut self, enabled: bool) -> Self {
        self.notifications_enabled = enabled;
        self
    }

    pub fn notify_on_timeout(mut self, enabled: bool) -> Self {
        self.notify_on_timeout = enabled;
        self
    }

    /// Render as the TOML a user would write
    pub fn to_toml(&self) -> String {
        let blocked = self
            .blocked_apps
            .iter()
            .map(|id| format!("\"{id}\""))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"[general]
interval_minutes = {}
log_level = "{}"
config_poll_seconds = {}

[blocking]
enabled = {}
blocked_apps = [{}]

[notifications]
enabled = {}
notify_on_timeout = {}
"#,
            self.interval_minutes,
            self.log_level,
            self.config_poll_seconds,
            self.blocking_enabled,
            blocked,
            self.notifications_enabled,
            self.notify_on_timeout,
        )
    }

    pub fn build(&self) -> Config {
        toml::from_str(&self.to_toml()).expect("builder produced invalid TOML")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fresh timer with a recorder attached
pub fn running_timer(
    settings: ReminderSettings,
    foreground_app: MockForegroundApp,
) -> (ReminderTimer<MockForegroundApp>, RecordingListener) {
    let recorder = RecordingListener::new();
    let mut timer = ReminderTimer::new(settings, foreground_app);
    timer.add_listener(Box::new(recorder.clone()));
    (timer, recorder)
}

/// Tick the armed timer `count` times
pub fn tick_n(timer: &mut ReminderTimer<MockForegroundApp>, count: u64) {
    for _ in 0..count {
        timer.tick();
    }
}
