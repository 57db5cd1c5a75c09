use anyhow::Result;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use tracing::{debug, error, info, warn};

use crate::config::{Config, ConfigSubscriber, NotificationConfig};
use crate::reminder::{DismissReason, ReminderListener};

// Type alias for the default notification manager type
#[cfg(not(any(test, feature = "test-mocks")))]
pub type DefaultReminderNotifier = ReminderNotifier<MacOSNotificationSender>;

#[cfg(any(test, feature = "test-mocks"))]
pub type DefaultReminderNotifier = ReminderNotifier<TestNotificationSender>;

/// Trait for sending notifications - allows for testing without system calls
pub trait NotificationSender {
    fn send(&self, title: &str, body: &str, sound: Option<&str>) -> Result<()>;
}

/// Production notification sender using macOS osascript
pub struct MacOSNotificationSender;

impl NotificationSender for MacOSNotificationSender {
    fn send(&self, title: &str, body: &str, sound: Option<&str>) -> Result<()> {
        send_native_macos_notification(title, body, sound)
    }
}

/// Test notification sender that doesn't actually send notifications
#[cfg(any(test, feature = "test-mocks"))]
#[derive(Clone, Default)]
pub struct TestNotificationSender {
    pub sent_notifications: std::sync::Arc<std::sync::Mutex<Vec<(String, String)>>>,
    pub should_fail: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(any(test, feature = "test-mocks"))]
impl TestNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_sent_notifications(&self) -> Vec<(String, String)> {
        self.sent_notifications.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent_notifications.lock().unwrap().clear();
    }

    /// Configure the sender to fail every send
    pub fn set_send_failure(&self, should_fail: bool) {
        self.should_fail
            .store(should_fail, std::sync::atomic::Ordering::Relaxed);
    }
}

#[cfg(any(test, feature = "test-mocks"))]
impl NotificationSender for TestNotificationSender {
    fn send(&self, title: &str, body: &str, _sound: Option<&str>) -> Result<()> {
        debug!("Test notification: {} - {}", title, body);
        if self.should_fail.load(std::sync::atomic::Ordering::Relaxed) {
            return Err(anyhow::anyhow!("Mock notification failure"));
        }
        self.sent_notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

/// Posts macOS notifications for break reminders.
///
/// Settings sit behind a lock so a reload can swap them while the notifier
/// is registered as a listener.
pub struct ReminderNotifier<T: NotificationSender = MacOSNotificationSender> {
    settings: RwLock<NotificationConfig>,
    sender: T,
}

impl DefaultReminderNotifier {
    pub fn new(config: &Config) -> Self {
        #[cfg(not(any(test, feature = "test-mocks")))]
        let sender = MacOSNotificationSender;
        // During tests, avoid real macOS notifications
        #[cfg(any(test, feature = "test-mocks"))]
        let sender = TestNotificationSender::new();

        Self::with_sender(config, sender)
    }
}

impl<T: NotificationSender> ReminderNotifier<T> {
    pub fn with_sender(config: &Config, sender: T) -> Self {
        Self {
            settings: RwLock::new(config.notifications.clone()),
            sender,
        }
    }

    fn settings(&self) -> RwLockReadGuard<'_, NotificationConfig> {
        self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the `[notifications]` settings in place
    pub fn apply_config(&self, notifications: &NotificationConfig) {
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        if *settings != *notifications {
            debug!("Notification settings updated: {:?}", notifications);
            *settings = notifications.clone();
        }
    }

    /// Send notification when a break is due
    pub fn break_due(&self) -> Result<()> {
        if !self.settings().enabled {
            return Ok(());
        }

        self.send_notification(
            "Time for a break",
            "Stand up, stretch and rest your eyes.",
            true,
        )?;

        info!("Sent break reminder notification");
        Ok(())
    }

    /// Send notification when an ignored reminder goes away on its own
    pub fn break_skipped(&self) -> Result<()> {
        let settings = self.settings();
        if !settings.enabled || !settings.notify_on_timeout {
            return Ok(());
        }
        drop(settings);

        self.send_notification(
            "Break skipped",
            "The reminder timed out. The next one is on its way.",
            false,
        )?;

        info!("Sent break skipped notification");
        Ok(())
    }

    /// Send a generic system notification using the configured sender
    fn send_notification(&self, title: &str, body: &str, with_sound: bool) -> Result<()> {
        debug!("Sending notification: {} - {}", title, body);

        let sound = if with_sound {
            self.settings().sound.clone()
        } else {
            None
        };
        self.sender.send(title, body, sound.as_deref())?;

        debug!("Successfully sent notification: {}", title);
        Ok(())
    }

    /// Check if notifications are enabled
    pub fn is_enabled(&self) -> bool {
        self.settings().enabled
    }

    /// Enable or disable notifications
    pub fn set_enabled(&self, enabled: bool) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .enabled = enabled;
        info!(
            "Notifications {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Access the underlying sender (for testing)
    #[cfg(any(test, feature = "test-mocks"))]
    pub fn sender(&self) -> &T {
        &self.sender
    }

    /// Test notification (for debugging)
    pub fn test_notification(&self) -> Result<()> {
        info!("Starting notification test...");

        let title = "Break Reminder";
        let body = "Notification system is working correctly!";

        let sound = self.settings().sound.clone();
        match self.sender.send(title, body, sound.as_deref()) {
            Ok(_) => {
                info!("Test notification sent successfully");
                info!("Check your notifications (should appear in top-right corner)");
            }
            Err(e) => {
                error!("Failed to send notification: {}", e);
                error!("This might be due to:");
                error!("1. Do Not Disturb / Focus mode is enabled");
                error!("2. osascript is not available or restricted");
                error!("3. System-level notification restrictions");
                return Err(anyhow::anyhow!("Failed to send notification: {}", e));
            }
        }

        info!("Test notification completed");
        Ok(())
    }
}

// Notification failures must never abort a tick
impl<T: NotificationSender> ReminderListener for ReminderNotifier<T> {
    fn on_reminder_shown(&self) {
        if let Err(e) = self.break_due() {
            warn!("Failed to send break reminder notification: {}", e);
        }
    }

    fn on_reminder_dismissed(&self, reason: DismissReason) {
        if reason != DismissReason::TimedOut {
            return;
        }
        if let Err(e) = self.break_skipped() {
            warn!("Failed to send break skipped notification: {}", e);
        }
    }
}

impl<T: NotificationSender + Send + Sync> ConfigSubscriber for ReminderNotifier<T> {
    fn on_config_reloaded(&self, config: &Config) {
        self.apply_config(&config.notifications);
    }
}

/// Send notification using native macOS osascript (more reliable for unsigned apps)
fn send_native_macos_notification(title: &str, body: &str, sound: Option<&str>) -> Result<()> {
    use std::process::Command;

    let mut script = format!(
        r#"display notification "{}" with title "{}""#,
        escape_applescript(body),
        escape_applescript(title)
    );
    if let Some(sound) = sound {
        script.push_str(&format!(r#" sound name "{}""#, escape_applescript(sound)));
    }

    let output = Command::new("osascript").args(["-e", &script]).output()?;

    if output.status.success() {
        Ok(())
    } else {
        let error = String::from_utf8_lossy(&output.stderr);
        Err(anyhow::anyhow!("osascript failed: {}", error))
    }
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
