pub mod config;
pub mod logging;
pub mod notifications;
pub mod reminder;
pub mod service;
pub mod system;

pub use config::Config;
pub use reminder::{ReminderSettings, ReminderTimer, TimerSnapshot};
pub use service::{ReminderDaemon, ReminderHandle};
