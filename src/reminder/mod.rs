pub mod clock;
pub mod events;
pub mod machine;
pub mod policy;
pub mod settings;
pub mod state;

pub use clock::{ClockSource, IntervalClock, TICK_PERIOD, TimerHandle, TimerKind};
pub use events::{ChannelListener, LoggingListener, ReminderEvent, ReminderListener};
pub use machine::ReminderTimer;
pub use policy::should_suppress;
pub use settings::ReminderSettings;
pub use state::{DismissReason, Phase, REMINDER_TIMEOUT_SECS, TimerSnapshot, TimerState};
