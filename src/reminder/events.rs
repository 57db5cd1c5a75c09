use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::state::DismissReason;

/// Events the state machine emits towards UI collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderEvent {
    Tick(u64),
    ReminderShown,
    ReminderDismissed(DismissReason),
    ReminderTimeoutTick(u64),
    Suppressed(String),
    Paused,
    Resumed,
    Stopped,
}

/// Subscriber interface for state machine events.
///
/// Every method has an empty default so listeners implement only what they
/// render. Listeners run inline on the tick path and must not block.
pub trait ReminderListener {
    /// Countdown advanced; `remaining_seconds` until the next reminder.
    fn on_tick(&self, _remaining_seconds: u64) {}

    fn on_reminder_shown(&self) {}

    fn on_reminder_dismissed(&self, _reason: DismissReason) {}

    /// Reminder is up; `remaining_seconds` until it times out.
    fn on_reminder_timeout_tick(&self, _remaining_seconds: u64) {}

    /// A due reminder was skipped because `app_id` was in front.
    fn on_suppressed(&self, _app_id: &str) {}

    fn on_paused(&self) {}

    fn on_resumed(&self) {}

    fn on_stopped(&self) {}
}

// Lets one listener be registered with the timer and kept elsewhere too
impl<L: ReminderListener + ?Sized> ReminderListener for Arc<L> {
    fn on_tick(&self, remaining_seconds: u64) {
        (**self).on_tick(remaining_seconds);
    }

    fn on_reminder_shown(&self) {
        (**self).on_reminder_shown();
    }

    fn on_reminder_dismissed(&self, reason: DismissReason) {
        (**self).on_reminder_dismissed(reason);
    }

    fn on_reminder_timeout_tick(&self, remaining_seconds: u64) {
        (**self).on_reminder_timeout_tick(remaining_seconds);
    }

    fn on_suppressed(&self, app_id: &str) {
        (**self).on_suppressed(app_id);
    }

    fn on_paused(&self) {
        (**self).on_paused();
    }

    fn on_resumed(&self) {
        (**self).on_resumed();
    }

    fn on_stopped(&self) {
        (**self).on_stopped();
    }
}

impl ReminderEvent {
    /// Deliver this event to `listener` through the matching callback.
    pub fn dispatch(&self, listener: &dyn ReminderListener) {
        match self {
            ReminderEvent::Tick(remaining) => listener.on_tick(*remaining),
            ReminderEvent::ReminderShown => listener.on_reminder_shown(),
            ReminderEvent::ReminderDismissed(reason) => listener.on_reminder_dismissed(*reason),
            ReminderEvent::ReminderTimeoutTick(remaining) => {
                listener.on_reminder_timeout_tick(*remaining)
            }
            ReminderEvent::Suppressed(app_id) => listener.on_suppressed(app_id),
            ReminderEvent::Paused => listener.on_paused(),
            ReminderEvent::Resumed => listener.on_resumed(),
            ReminderEvent::Stopped => listener.on_stopped(),
        }
    }
}

/// Writes lifecycle events to the tracing log
pub struct LoggingListener;

impl ReminderListener for LoggingListener {
    fn on_tick(&self, remaining_seconds: u64) {
        if remaining_seconds % 60 == 0 {
            debug!("{} minutes until next break", remaining_seconds / 60);
        }
    }

    fn on_reminder_shown(&self) {
        info!("Break reminder shown");
    }

    fn on_reminder_dismissed(&self, reason: DismissReason) {
        info!("Break reminder dismissed ({:?})", reason);
    }

    fn on_suppressed(&self, app_id: &str) {
        info!("Break reminder suppressed, {} is in front", app_id);
    }

    fn on_paused(&self) {
        info!("Break timer paused");
    }

    fn on_resumed(&self) {
        info!("Break timer resumed");
    }

    fn on_stopped(&self) {
        info!("Break timer stopped");
    }
}

/// Forwards every event into an unbounded channel.
///
/// Lets a UI running on another task consume events without being called
/// from the tick path.
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<ReminderEvent>,
}

impl ChannelListener {
    pub fn new(sender: mpsc::UnboundedSender<ReminderEvent>) -> Self {
        Self { sender }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ReminderEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    fn forward(&self, event: ReminderEvent) {
        if let Err(e) = self.sender.send(event) {
            warn!("Dropping reminder event, receiver closed: {:?}", e.0);
        }
    }
}

impl ReminderListener for ChannelListener {
    fn on_tick(&self, remaining_seconds: u64) {
        self.forward(ReminderEvent::Tick(remaining_seconds));
    }

    fn on_reminder_shown(&self) {
        self.forward(ReminderEvent::ReminderShown);
    }

    fn on_reminder_dismissed(&self, reason: DismissReason) {
        self.forward(ReminderEvent::ReminderDismissed(reason));
    }

    fn on_reminder_timeout_tick(&self, remaining_seconds: u64) {
        self.forward(ReminderEvent::ReminderTimeoutTick(remaining_seconds));
    }

    fn on_suppressed(&self, app_id: &str) {
        self.forward(ReminderEvent::Suppressed(app_id.to_string()));
    }

    fn on_paused(&self) {
        self.forward(ReminderEvent::Paused);
    }

    fn on_resumed(&self) {
        self.forward(ReminderEvent::Resumed);
    }

    fn on_stopped(&self) {
        self.forward(ReminderEvent::Stopped);
    }
}
