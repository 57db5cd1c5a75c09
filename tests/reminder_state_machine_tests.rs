use break_reminder::reminder::{
    DismissReason, Phase, REMINDER_TIMEOUT_SECS, ReminderEvent, ReminderTimer,
};
use break_reminder::system::{MockForegroundApp, RecordingListener};

mod test_utils;
use test_utils::{ReminderSettingsBuilder, running_timer, tick_n};

/// Countdown behaviour from a fresh start
#[cfg(test)]
mod countdown {
    use super::*;

    #[test]
    fn test_new_timer_counts_down_immediately() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(20).build();
        let mut timer = ReminderTimer::new(settings, MockForegroundApp::new());

        assert_eq!(timer.phase(), Phase::Running);
        assert_eq!(timer.remaining_seconds(), 1200);
        assert!(timer.armed_timer().is_some());

        timer.tick();
        assert_eq!(timer.remaining_seconds(), 1199);
    }

    #[test]
    fn test_fresh_timer_reminds_after_interval_without_setup() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(2).build();
        let recorder = RecordingListener::new();
        let mut timer = ReminderTimer::new(settings, MockForegroundApp::new());
        timer.add_listener(Box::new(recorder.clone()));

        tick_n(&mut timer, 119);
        assert_eq!(recorder.shown_count(), 0);

        timer.tick();
        assert_eq!(timer.phase(), Phase::Reminding);
        assert_eq!(recorder.shown_count(), 1);
    }

    #[test]
    fn test_reminder_shown_exactly_at_interval() {
        for minutes in [1, 2, 5] {
            let settings = ReminderSettingsBuilder::new()
                .interval_minutes(minutes)
                .build();
            let (mut timer, recorder) = running_timer(settings, MockForegroundApp::new());

            tick_n(&mut timer, minutes * 60 - 1);
            assert_eq!(timer.phase(), Phase::Running, "{minutes} min: too early");
            assert_eq!(timer.remaining_seconds(), 1);
            assert_eq!(recorder.shown_count(), 0);

            timer.tick();
            assert_eq!(timer.phase(), Phase::Reminding);
            assert_eq!(recorder.shown_count(), 1);

            // The countdown is suspended while the reminder is up
            tick_n(&mut timer, 10);
            assert_eq!(recorder.shown_count(), 1);
            assert_eq!(timer.remaining_seconds(), 0);
        }
    }

    #[test]
    fn test_tick_events_report_remaining_time() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(1).build();
        let (mut timer, recorder) = running_timer(settings, MockForegroundApp::new());

        tick_n(&mut timer, 3);

        assert_eq!(
            recorder.get_events(),
            vec![
                ReminderEvent::Tick(59),
                ReminderEvent::Tick(58),
                ReminderEvent::Tick(57)
            ]
        );
    }

    #[test]
    fn test_double_expire_shows_one_reminder() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(1).build();
        let (mut timer, recorder) = running_timer(settings, MockForegroundApp::new());

        timer.expire();
        timer.expire();
        timer.show_reminder();

        assert_eq!(timer.phase(), Phase::Reminding);
        assert_eq!(recorder.shown_count(), 1);
    }

    #[test]
    fn test_remaining_never_underflows() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(1).build();
        let (mut timer, _recorder) = running_timer(settings, MockForegroundApp::new());

        tick_n(&mut timer, 60 + REMINDER_TIMEOUT_SECS + 120);

        assert!(timer.remaining_seconds() <= 60);
    }
}

/// Reminder display, dismissal and timeout
#[cfg(test)]
mod reminder_lifecycle {
    use super::*;

    fn reminding_timer() -> (ReminderTimer<MockForegroundApp>, RecordingListener) {
        let settings = ReminderSettingsBuilder::new().interval_minutes(1).build();
        let (mut timer, recorder) = running_timer(settings, MockForegroundApp::new());
        tick_n(&mut timer, 60);
        assert_eq!(timer.phase(), Phase::Reminding);
        recorder.clear();
        (timer, recorder)
    }

    #[test]
    fn test_dismiss_restarts_countdown() {
        let (mut timer, recorder) = reminding_timer();

        tick_n(&mut timer, 30);
        timer.dismiss();

        assert_eq!(timer.phase(), Phase::Running);
        assert_eq!(timer.remaining_seconds(), 60);
        assert_eq!(timer.reminder_elapsed_seconds(), 0);
        assert_eq!(
            recorder.count(&ReminderEvent::ReminderDismissed(DismissReason::User)),
            1
        );
    }

    #[test]
    fn test_dismiss_outside_reminder_is_ignored() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(1).build();
        let (mut timer, recorder) = running_timer(settings, MockForegroundApp::new());
        tick_n(&mut timer, 10);
        let before = timer.snapshot();

        timer.dismiss();

        assert_eq!(timer.snapshot(), before);
        assert!(recorder
            .get_events()
            .iter()
            .all(|e| !matches!(e, ReminderEvent::ReminderDismissed(_))));
    }

    #[test]
    fn test_reminder_times_out_after_five_minutes() {
        let (mut timer, recorder) = reminding_timer();

        tick_n(&mut timer, REMINDER_TIMEOUT_SECS - 1);
        assert_eq!(timer.phase(), Phase::Reminding);
        assert_eq!(timer.snapshot().reminder_timeout_remaining, Some(1));

        timer.tick();

        assert_eq!(timer.phase(), Phase::Running);
        assert_eq!(timer.remaining_seconds(), 60);
        assert_eq!(
            recorder.count(&ReminderEvent::ReminderDismissed(DismissReason::TimedOut)),
            1
        );
        assert_eq!(recorder.count(&ReminderEvent::ReminderTimeoutTick(0)), 1);
    }

    #[test]
    fn test_cycle_repeats_after_timeout() {
        let (mut timer, recorder) = reminding_timer();

        tick_n(&mut timer, REMINDER_TIMEOUT_SECS);
        tick_n(&mut timer, 60);

        assert_eq!(timer.phase(), Phase::Reminding);
        assert_eq!(recorder.shown_count(), 1);
    }

    #[test]
    fn test_stale_countdown_handle_is_dropped() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(1).build();
        let (mut timer, _recorder) = running_timer(settings, MockForegroundApp::new());
        let countdown = timer.armed_timer().unwrap();

        tick_n(&mut timer, 60);
        assert_eq!(timer.phase(), Phase::Reminding);

        // A tick queued for the old countdown must not touch the reminder
        assert!(!timer.tick_timer(countdown));
        assert_eq!(timer.reminder_elapsed_seconds(), 0);
    }
}

/// Pause, resume, reset and stop
#[cfg(test)]
mod commands {
    use super::*;

    #[test]
    fn test_pause_freezes_countdown() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(1).build();
        let (mut timer, recorder) = running_timer(settings, MockForegroundApp::new());
        tick_n(&mut timer, 10);

        timer.pause();
        tick_n(&mut timer, 100);

        assert_eq!(timer.phase(), Phase::Paused);
        assert_eq!(timer.remaining_seconds(), 50);
        assert!(timer.armed_timer().is_none());

        timer.resume();
        timer.tick();
        assert_eq!(timer.remaining_seconds(), 49);
        assert_eq!(recorder.count(&ReminderEvent::Paused), 1);
        assert_eq!(recorder.count(&ReminderEvent::Resumed), 1);
    }

    #[test]
    fn test_pause_while_reminding_is_ignored() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(1).build();
        let (mut timer, _recorder) = running_timer(settings, MockForegroundApp::new());
        tick_n(&mut timer, 60);

        timer.pause();
        timer.toggle_pause();

        assert_eq!(timer.phase(), Phase::Reminding);
    }

    #[test]
    fn test_reset_clears_pause_and_reminder() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(2).build();
        let (mut timer, _recorder) = running_timer(settings.clone(), MockForegroundApp::new());
        tick_n(&mut timer, 30);
        timer.pause();

        timer.reset_timer();
        assert_eq!(timer.phase(), Phase::Running);
        assert_eq!(timer.remaining_seconds(), 120);

        let (mut timer, recorder) = running_timer(settings, MockForegroundApp::new());
        tick_n(&mut timer, 120);
        timer.reset_timer();
        assert_eq!(timer.phase(), Phase::Running);
        assert_eq!(timer.remaining_seconds(), 120);
        assert_eq!(
            recorder.count(&ReminderEvent::ReminderDismissed(DismissReason::Reset)),
            1
        );
    }

    #[test]
    fn test_stop_is_terminal() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(1).build();
        let (mut timer, recorder) = running_timer(settings, MockForegroundApp::new());
        tick_n(&mut timer, 5);

        timer.stop();
        timer.tick();
        timer.resume();
        timer.reset_timer();
        timer.show_reminder();

        assert_eq!(timer.phase(), Phase::Stopped);
        assert_eq!(timer.remaining_seconds(), 0);
        assert!(timer.armed_timer().is_none());
        assert_eq!(recorder.count(&ReminderEvent::Stopped), 1);
        assert_eq!(recorder.shown_count(), 0);
    }
}

/// Settings changes while the timer runs
#[cfg(test)]
mod apply_config {
    use super::*;

    #[test]
    fn test_interval_change_resets_to_new_full_interval() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(30).build();
        let (mut timer, _recorder) = running_timer(settings, MockForegroundApp::new());
        tick_n(&mut timer, 600);
        assert_eq!(timer.remaining_seconds(), 1200);

        timer.apply_config(ReminderSettingsBuilder::new().interval_minutes(5).build());

        assert_eq!(timer.remaining_seconds(), 300);
        assert_eq!(timer.phase(), Phase::Running);
    }

    #[test]
    fn test_interval_change_while_paused_stays_paused() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(30).build();
        let (mut timer, _recorder) = running_timer(settings, MockForegroundApp::new());
        timer.pause();

        timer.apply_config(ReminderSettingsBuilder::new().interval_minutes(10).build());

        assert_eq!(timer.phase(), Phase::Paused);
        assert_eq!(timer.remaining_seconds(), 600);
    }

    #[test]
    fn test_blocklist_change_keeps_countdown() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(10).build();
        let (mut timer, _recorder) = running_timer(settings, MockForegroundApp::new());
        tick_n(&mut timer, 30);

        timer.apply_config(
            ReminderSettingsBuilder::new()
                .interval_minutes(10)
                .block("us.zoom.xos")
                .build(),
        );

        assert_eq!(timer.remaining_seconds(), 570);
        assert!(timer.settings().blocked_app_ids.contains("us.zoom.xos"));
    }

    #[test]
    fn test_new_interval_used_after_reminder() {
        let settings = ReminderSettingsBuilder::new().interval_minutes(1).build();
        let (mut timer, _recorder) = running_timer(settings, MockForegroundApp::new());
        tick_n(&mut timer, 60);

        timer.apply_config(ReminderSettingsBuilder::new().interval_minutes(3).build());
        assert_eq!(timer.phase(), Phase::Reminding);

        timer.dismiss();
        assert_eq!(timer.remaining_seconds(), 180);
    }
}
