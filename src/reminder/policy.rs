use super::ReminderSettings;

/// Decide whether a due reminder should be skipped because of the app in front.
///
/// Only consulted when the countdown expires, never on ordinary ticks.
pub fn should_suppress(frontmost_app_id: Option<&str>, settings: &ReminderSettings) -> bool {
    if !settings.blocking_enabled {
        return false;
    }

    match frontmost_app_id {
        Some(app_id) => settings.blocked_app_ids.contains(app_id),
        None => false,
    }
}
