use anyhow::Result;
use signal_hook::consts::signal::*;
use signal_hook_tokio::Signals;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{info, warn};

/// Signal types that can be received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    Shutdown,    // SIGTERM / SIGINT
    Reload,      // SIGHUP
    TogglePause, // SIGUSR1
    Dismiss,     // SIGUSR2
}

impl SignalType {
    /// Map a raw signal number onto the action it requests
    pub fn from_raw(signal: i32) -> Option<Self> {
        match signal {
            SIGTERM | SIGINT => Some(SignalType::Shutdown),
            SIGHUP => Some(SignalType::Reload),
            SIGUSR1 => Some(SignalType::TogglePause),
            SIGUSR2 => Some(SignalType::Dismiss),
            _ => None,
        }
    }

    /// Raw signal number used to request this action from another process
    pub fn as_raw(self) -> i32 {
        match self {
            SignalType::Shutdown => SIGTERM,
            SignalType::Reload => SIGHUP,
            SignalType::TogglePause => SIGUSR1,
            SignalType::Dismiss => SIGUSR2,
        }
    }
}

/// Handles system signals for graceful shutdown and daemon control
#[derive(Clone)]
pub struct SignalHandler {
    shutdown_flag: Arc<AtomicBool>,
    signal_sender: Option<mpsc::UnboundedSender<SignalType>>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            signal_sender: None,
        }
    }

    pub fn with_sender(signal_sender: mpsc::UnboundedSender<SignalType>) -> Self {
        Self {
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            signal_sender: Some(signal_sender),
        }
    }

    /// Create a handler together with the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SignalType>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::with_sender(sender), receiver)
    }

    /// Get a reference to the shutdown flag
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown_flag.clone()
    }

    /// Listen for SIGTERM, SIGINT, SIGHUP, SIGUSR1 and SIGUSR2 until shutdown
    pub async fn listen_for_signals(&self) -> Result<()> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP, SIGUSR1, SIGUSR2])?;

        info!("Signal handler initialized, listening for SIGTERM, SIGINT, SIGHUP, SIGUSR1, SIGUSR2");

        while let Some(signal) = signals.next().await {
            let Some(signal_type) = SignalType::from_raw(signal) else {
                warn!("Received unexpected signal: {}", signal);
                continue;
            };

            if self.dispatch(signal_type) {
                break;
            }
        }

        Ok(())
    }

    /// Forward a received signal; returns true once shutdown was requested
    fn dispatch(&self, signal_type: SignalType) -> bool {
        info!("Received {:?} signal", signal_type);

        if signal_type == SignalType::Shutdown {
            self.shutdown_flag.store(true, Ordering::Relaxed);
        }

        match &self.signal_sender {
            Some(sender) => {
                if let Err(e) = sender.send(signal_type) {
                    warn!("Failed to forward {:?} signal: {}", signal_type, e);
                }
            }
            None => warn!(
                "No signal receiver configured, {:?} request ignored",
                signal_type
            ),
        }

        signal_type == SignalType::Shutdown
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag.load(Ordering::Relaxed)
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_mapping_round_trips() {
        for signal_type in [
            SignalType::Shutdown,
            SignalType::Reload,
            SignalType::TogglePause,
            SignalType::Dismiss,
        ] {
            assert_eq!(SignalType::from_raw(signal_type.as_raw()), Some(signal_type));
        }
        assert_eq!(SignalType::from_raw(SIGINT), Some(SignalType::Shutdown));
        assert_eq!(SignalType::from_raw(libc::SIGWINCH), None);
    }

    #[test]
    fn test_dispatch_forwards_and_flags_shutdown() {
        let (handler, mut receiver) = SignalHandler::channel();

        assert!(!handler.dispatch(SignalType::TogglePause));
        assert!(!handler.is_shutdown_requested());

        assert!(handler.dispatch(SignalType::Shutdown));
        assert!(handler.is_shutdown_requested());

        assert_eq!(receiver.try_recv().unwrap(), SignalType::TogglePause);
        assert_eq!(receiver.try_recv().unwrap(), SignalType::Shutdown);
    }
}
