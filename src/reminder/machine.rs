use std::time::Instant;
use tracing::{debug, info, warn};

use super::clock::{TimerHandle, TimerKind};
use super::events::{ReminderEvent, ReminderListener};
use super::policy::should_suppress;
use super::settings::ReminderSettings;
use super::state::{DismissReason, Phase, REMINDER_TIMEOUT_SECS, TimerSnapshot, TimerState};
use crate::system::ForegroundAppInterface;

type BoxedListener = Box<dyn ReminderListener + Send>;

/// Break reminder lifecycle: countdown, reminder, timeout, pause.
///
/// Every operation is total. Calls that make no sense in the current phase
/// (dismissing while running, pausing while a reminder is up) leave the
/// state untouched. At most one timer is armed at a time; ticks are routed
/// to it through its [`TimerHandle`].
pub struct ReminderTimer<A: ForegroundAppInterface> {
    settings: ReminderSettings,
    state: TimerState,
    armed: Option<TimerHandle>,
    generation: u64,
    foreground_app: A,
    listeners: Vec<BoxedListener>,
}

impl<A: ForegroundAppInterface> ReminderTimer<A> {
    /// Create a timer that is already counting down the full interval.
    pub fn new(settings: ReminderSettings, foreground_app: A) -> Self {
        let state = TimerState::new(settings.interval_seconds());

        info!(
            "Starting break timer, next break in {} minutes",
            settings.interval_minutes
        );
        let mut timer = Self {
            settings,
            state,
            armed: None,
            generation: 0,
            foreground_app,
            listeners: Vec::new(),
        };
        timer.arm(TimerKind::Countdown);
        timer
    }

    /// Register a listener; events reach listeners in registration order.
    pub fn add_listener(&mut self, listener: BoxedListener) {
        self.listeners.push(listener);
    }

    /// Advance whichever timer is currently armed by one second.
    pub fn tick(&mut self) {
        if let Some(handle) = self.armed {
            self.tick_timer(handle);
        }
    }

    /// Advance the timer named by `handle`.
    ///
    /// Returns false, without touching state, when the handle was cancelled
    /// by an earlier transition.
    pub fn tick_timer(&mut self, handle: TimerHandle) -> bool {
        if self.armed != Some(handle) {
            debug!("Dropping stale tick for {:?}", handle);
            return false;
        }

        self.state.last_tick = Some(Instant::now());
        match handle.kind {
            TimerKind::Countdown => self.countdown_tick(),
            TimerKind::ReminderTimeout => self.reminder_timeout_tick(),
        }
        true
    }

    fn countdown_tick(&mut self) {
        if self.state.remaining_seconds > 0 {
            self.state.remaining_seconds -= 1;
            self.emit(ReminderEvent::Tick(self.state.remaining_seconds));
        }

        if self.state.remaining_seconds == 0 {
            self.expire();
        }
    }

    fn reminder_timeout_tick(&mut self) {
        self.state.reminder_elapsed_seconds += 1;
        let remaining = REMINDER_TIMEOUT_SECS.saturating_sub(self.state.reminder_elapsed_seconds);
        self.emit(ReminderEvent::ReminderTimeoutTick(remaining));

        if remaining == 0 {
            info!(
                "Break reminder timed out after {} seconds",
                REMINDER_TIMEOUT_SECS
            );
            self.finish_reminder(DismissReason::TimedOut);
        }
    }

    /// Countdown deadline reached: suppress or show the reminder.
    ///
    /// Only acts while `Running`, so a second expiry racing the first one
    /// finds the machine already `Reminding` and does nothing.
    pub fn expire(&mut self) {
        if self.state.phase != Phase::Running {
            debug!("expire() ignored in phase {}", self.state.phase);
            return;
        }

        let frontmost = match self.foreground_app.frontmost_app_id() {
            Ok(app_id) => app_id,
            Err(e) => {
                warn!("Could not determine frontmost application: {}", e);
                None
            }
        };

        if should_suppress(frontmost.as_deref(), &self.settings) {
            let app_id = frontmost.unwrap_or_default();
            self.state.remaining_seconds = self.settings.interval_seconds();
            // Re-arm so the next countdown starts a full period from now
            self.arm(TimerKind::Countdown);
            self.emit(ReminderEvent::Suppressed(app_id));
            self.emit(ReminderEvent::Tick(self.state.remaining_seconds));
            return;
        }

        self.show_reminder();
    }

    /// Put the reminder up without consulting the blocklist.
    ///
    /// No-op while a reminder is already shown or after `stop()`.
    pub fn show_reminder(&mut self) {
        match self.state.phase {
            Phase::Reminding | Phase::Stopped => {
                debug!("show_reminder() ignored in phase {}", self.state.phase);
                return;
            }
            Phase::Running | Phase::Paused => {}
        }

        self.state.phase = Phase::Reminding;
        self.state.remaining_seconds = 0;
        self.state.reminder_elapsed_seconds = 0;
        self.arm(TimerKind::ReminderTimeout);
        self.emit(ReminderEvent::ReminderShown);
    }

    /// Close a shown reminder and restart the countdown.
    pub fn dismiss(&mut self) {
        if self.state.phase != Phase::Reminding {
            debug!("dismiss() ignored in phase {}", self.state.phase);
            return;
        }

        self.finish_reminder(DismissReason::User);
    }

    fn finish_reminder(&mut self, reason: DismissReason) {
        self.state.phase = Phase::Running;
        self.state.remaining_seconds = self.settings.interval_seconds();
        self.state.reminder_elapsed_seconds = 0;
        self.arm(TimerKind::Countdown);
        self.emit(ReminderEvent::ReminderDismissed(reason));
        self.emit(ReminderEvent::Tick(self.state.remaining_seconds));
    }

    pub fn pause(&mut self) {
        if self.state.phase != Phase::Running {
            debug!("pause() ignored in phase {}", self.state.phase);
            return;
        }

        self.state.phase = Phase::Paused;
        self.disarm();
        self.emit(ReminderEvent::Paused);
    }

    pub fn resume(&mut self) {
        if self.state.phase != Phase::Paused {
            debug!("resume() ignored in phase {}", self.state.phase);
            return;
        }

        self.state.phase = Phase::Running;
        self.arm(TimerKind::Countdown);
        self.emit(ReminderEvent::Resumed);
    }

    pub fn toggle_pause(&mut self) {
        match self.state.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            phase => debug!("toggle_pause() ignored in phase {}", phase),
        }
    }

    /// Restart the countdown from the full interval, clearing any pause.
    pub fn reset_timer(&mut self) {
        let previous = self.state.phase;
        if previous == Phase::Stopped {
            debug!("reset_timer() ignored after stop");
            return;
        }

        info!(
            "Resetting break timer to {} minutes",
            self.settings.interval_minutes
        );
        self.state.phase = Phase::Running;
        self.state.remaining_seconds = self.settings.interval_seconds();
        self.state.reminder_elapsed_seconds = 0;
        self.arm(TimerKind::Countdown);

        if previous == Phase::Reminding {
            self.emit(ReminderEvent::ReminderDismissed(DismissReason::Reset));
        }
        self.emit(ReminderEvent::Tick(self.state.remaining_seconds));
    }

    /// Halt for good. Every timer is disarmed; later ticks are dropped.
    pub fn stop(&mut self) {
        let previous = self.state.phase;
        if previous == Phase::Stopped {
            return;
        }

        self.state.phase = Phase::Stopped;
        self.state.remaining_seconds = 0;
        self.state.reminder_elapsed_seconds = 0;
        self.state.last_tick = None;
        self.disarm();

        if previous == Phase::Reminding {
            self.emit(ReminderEvent::ReminderDismissed(DismissReason::Stopped));
        }
        self.emit(ReminderEvent::Stopped);
    }

    /// Replace the settings.
    ///
    /// An interval change restarts the countdown from the new full interval
    /// unless a reminder is up; pause state is kept.
    pub fn apply_config(&mut self, settings: ReminderSettings) {
        let interval_changed = settings.interval_minutes != self.settings.interval_minutes;
        self.settings = settings;

        if !interval_changed {
            debug!("Settings applied, interval unchanged");
            return;
        }

        info!(
            "Break interval changed to {} minutes",
            self.settings.interval_minutes
        );
        match self.state.phase {
            Phase::Paused => {
                self.state.remaining_seconds = self.settings.interval_seconds();
            }
            Phase::Running => {
                self.state.remaining_seconds = self.settings.interval_seconds();
                self.arm(TimerKind::Countdown);
                self.emit(ReminderEvent::Tick(self.state.remaining_seconds));
            }
            Phase::Reminding | Phase::Stopped => {}
        }
    }

    fn arm(&mut self, kind: TimerKind) {
        self.generation = self.generation.wrapping_add(1);
        self.armed = Some(TimerHandle {
            kind,
            generation: self.generation,
        });
    }

    fn disarm(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.armed = None;
    }

    fn emit(&self, event: ReminderEvent) {
        for listener in &self.listeners {
            event.dispatch(listener.as_ref());
        }
    }

    /// Handle of the timer currently armed, if any
    pub fn armed_timer(&self) -> Option<TimerHandle> {
        self.armed
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state.remaining_seconds
    }

    pub fn reminder_elapsed_seconds(&self) -> u64 {
        self.state.reminder_elapsed_seconds
    }

    pub fn is_paused(&self) -> bool {
        self.state.phase == Phase::Paused
    }

    pub fn is_reminding(&self) -> bool {
        self.state.phase == Phase::Reminding
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn settings(&self) -> &ReminderSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
            reminder_elapsed_seconds: self.state.reminder_elapsed_seconds,
            reminder_timeout_remaining: self.state.reminder_timeout_remaining(),
            interval_minutes: self.settings.interval_minutes,
        }
    }

    /// Access the foreground app query (for testing)
    #[cfg(any(test, feature = "test-mocks"))]
    pub fn foreground_app(&self) -> &A {
        &self.foreground_app
    }
}
