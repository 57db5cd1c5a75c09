use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Settings the state machine reads on every tick.
///
/// Built from the on-disk configuration and replaced wholesale through
/// [`ReminderTimer::apply_config`](super::ReminderTimer::apply_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub interval_minutes: u64,
    pub blocking_enabled: bool,
    pub blocked_app_ids: HashSet<String>,
}

impl ReminderSettings {
    /// An interval of zero minutes is raised to one.
    pub fn new(interval_minutes: u64) -> Self {
        Self {
            interval_minutes: interval_minutes.max(1),
            blocking_enabled: false,
            blocked_app_ids: HashSet::new(),
        }
    }

    pub fn with_blocked_apps<I, S>(mut self, app_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocking_enabled = true;
        self.blocked_app_ids = app_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_blocking_enabled(mut self, enabled: bool) -> Self {
        self.blocking_enabled = enabled;
        self
    }

    /// Length of a full countdown in seconds.
    pub fn interval_seconds(&self) -> u64 {
        self.interval_minutes.max(1).saturating_mul(60)
    }
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self::new(20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_is_clamped() {
        let settings = ReminderSettings::new(0);
        assert_eq!(settings.interval_minutes, 1);
        assert_eq!(settings.interval_seconds(), 60);
    }

    #[test]
    fn test_huge_interval_saturates() {
        let settings = ReminderSettings::new(u64::MAX / 2);
        assert_eq!(settings.interval_seconds(), u64::MAX);
    }

    #[test]
    fn test_with_blocked_apps_enables_blocking() {
        let settings = ReminderSettings::new(5).with_blocked_apps(["us.zoom.xos"]);
        assert!(settings.blocking_enabled);
        assert!(settings.blocked_app_ids.contains("us.zoom.xos"));
    }
}
