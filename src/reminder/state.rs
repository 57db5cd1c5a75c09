use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// How long a reminder stays up before it dismisses itself.
pub const REMINDER_TIMEOUT_SECS: u64 = 300;

/// Discrete lifecycle stage of the reminder timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Running,
    Paused,
    Reminding,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Reminding => "reminding",
            Phase::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}

/// Why a shown reminder went away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DismissReason {
    User,     // Explicit dismiss command
    TimedOut, // Reminder timeout elapsed
    Reset,    // Countdown reset while the reminder was up
    Stopped,  // Timer stopped while the reminder was up
}

#[derive(Debug, Clone)]
pub struct TimerState {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub reminder_elapsed_seconds: u64,
    pub last_tick: Option<Instant>,
}

impl TimerState {
    /// Fresh countdown, already running
    pub fn new(remaining_seconds: u64) -> Self {
        Self {
            phase: Phase::Running,
            remaining_seconds,
            reminder_elapsed_seconds: 0,
            last_tick: None,
        }
    }

    /// Seconds left before a shown reminder times out, if one is shown.
    pub fn reminder_timeout_remaining(&self) -> Option<u64> {
        if self.phase == Phase::Reminding {
            Some(REMINDER_TIMEOUT_SECS.saturating_sub(self.reminder_elapsed_seconds))
        } else {
            None
        }
    }
}

/// Point-in-time copy of the timer published to status consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub remaining_seconds: u64,
    pub reminder_elapsed_seconds: u64,
    pub reminder_timeout_remaining: Option<u64>,
    pub interval_minutes: u64,
}

impl TimerSnapshot {
    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_reminding(&self) -> bool {
        self.phase == Phase::Reminding
    }

    /// `MM:SS` rendering of the countdown, as a menu bar title would show it
    pub fn countdown_label(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }
}
