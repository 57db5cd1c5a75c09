pub mod control;
pub mod daemon;
pub mod signals;

pub use control::{PidFile, is_process_alive, send_signal};
pub use daemon::{Command, ReminderDaemon, ReminderHandle, ServiceInstaller};
pub use signals::{SignalHandler, SignalType};
