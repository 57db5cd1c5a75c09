use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use super::signals::SignalType;
use crate::config::{Config, ConfigLoader, ConfigSubscriber};
use crate::notifications::{NotificationSender, ReminderNotifier};
use crate::reminder::{
    ChannelListener, ClockSource, IntervalClock, LoggingListener, Phase, ReminderEvent,
    ReminderListener, ReminderSettings, ReminderTimer, TimerSnapshot,
};
use crate::system::{FileSystemInterface, ForegroundAppInterface};

/// Requests a UI or CLI front end can make of the running timer
#[derive(Debug)]
pub enum Command {
    Pause,
    Resume,
    TogglePause,
    Dismiss,
    Reset,
    ShowReminder,
    Stop,
    ApplySettings(ReminderSettings),
    Snapshot(oneshot::Sender<TimerSnapshot>),
}

/// Cloneable front-end handle to a [`ReminderDaemon`]
#[derive(Clone)]
pub struct ReminderHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<TimerSnapshot>,
}

impl ReminderHandle {
    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(Command::Resume)
    }

    pub fn toggle_pause(&self) -> Result<()> {
        self.send(Command::TogglePause)
    }

    pub fn dismiss(&self) -> Result<()> {
        self.send(Command::Dismiss)
    }

    pub fn reset(&self) -> Result<()> {
        self.send(Command::Reset)
    }

    /// Show a reminder now, bypassing the blocklist
    pub fn show_reminder(&self) -> Result<()> {
        self.send(Command::ShowReminder)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    pub fn apply_settings(&self, settings: ReminderSettings) -> Result<()> {
        self.send(Command::ApplySettings(settings))
    }

    /// Ask the daemon for a fresh snapshot once it has drained earlier commands
    pub async fn snapshot(&self) -> Result<TimerSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Snapshot(reply_tx))?;
        reply_rx.await.context("Reminder daemon dropped the snapshot request")
    }

    /// Last snapshot the daemon published
    pub fn current(&self) -> TimerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch channel updated after every transition
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.clone()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|e| anyhow::anyhow!("Reminder daemon is not running ({:?})", e.0))
    }
}

/// Drives the reminder state machine from a clock, commands, signals and
/// configuration changes, one event at a time.
pub struct ReminderDaemon<A: ForegroundAppInterface, C: ClockSource, F: FileSystemInterface> {
    timer: ReminderTimer<A>,
    clock: C,
    config_loader: ConfigLoader<F>,
    config: Config,
    last_config_modified: Option<SystemTime>,
    commands: mpsc::UnboundedReceiver<Command>,
    signals: Option<mpsc::UnboundedReceiver<SignalType>>,
    snapshot_tx: watch::Sender<TimerSnapshot>,
    config_subscribers: Vec<Arc<dyn ConfigSubscriber>>,
}

impl<A: ForegroundAppInterface, C: ClockSource, F: FileSystemInterface> ReminderDaemon<A, C, F> {
    pub fn new(
        foreground_app: A,
        clock: C,
        config_loader: ConfigLoader<F>,
    ) -> Result<(Self, ReminderHandle)> {
        let config = config_loader.load_config()?;
        Ok(Self::with_config(foreground_app, clock, config_loader, config))
    }

    /// Build around a configuration the caller already loaded from `config_loader`
    pub fn with_config(
        foreground_app: A,
        clock: C,
        config_loader: ConfigLoader<F>,
        config: Config,
    ) -> (Self, ReminderHandle) {
        let last_config_modified = config_loader.modified_time();

        let mut timer = ReminderTimer::new(config.reminder_settings(), foreground_app);
        timer.add_listener(Box::new(LoggingListener));

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(timer.snapshot());

        let daemon = Self {
            timer,
            clock,
            config_loader,
            config,
            last_config_modified,
            commands: command_rx,
            signals: None,
            snapshot_tx,
            config_subscribers: Vec::new(),
        };
        let handle = ReminderHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };

        (daemon, handle)
    }

    /// Route OS signals into the loop
    pub fn with_signals(mut self, signals: mpsc::UnboundedReceiver<SignalType>) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn add_listener(&mut self, listener: Box<dyn ReminderListener + Send>) {
        self.timer.add_listener(listener);
    }

    /// Register a collaborator that is handed every successfully reloaded config
    pub fn add_config_subscriber(&mut self, subscriber: Arc<dyn ConfigSubscriber>) {
        self.config_subscribers.push(subscriber);
    }

    /// Post notifications through `sender`, following `[notifications]` on reload
    pub fn add_notifier<T>(&mut self, sender: T)
    where
        T: NotificationSender + Send + Sync + 'static,
    {
        let notifier = Arc::new(ReminderNotifier::with_sender(&self.config, sender));
        self.timer.add_listener(Box::new(Arc::clone(&notifier)));
        self.add_config_subscriber(notifier);
    }

    /// Feed of every timer event, for a front end running on another task
    pub fn subscribe_events(&mut self) -> mpsc::UnboundedReceiver<ReminderEvent> {
        let (listener, events) = ChannelListener::channel();
        self.timer.add_listener(Box::new(listener));
        events
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run until the timer is stopped by a command or a shutdown signal
    pub async fn run(mut self) -> Result<()> {
        info!(
            "Break reminder daemon running (interval {} min, blocking {})",
            self.config.general.interval_minutes,
            if self.config.blocking.enabled { "on" } else { "off" }
        );

        let mut armed = self.timer.armed_timer();
        self.clock.reset();
        self.publish();

        let mut poll_period = self.poll_period();
        let mut config_poll = config_poll_interval(poll_period);

        loop {
            // Polled in order: signals, then queued commands, then time
            tokio::select! {
                biased;
                Some(signal) = next_signal(&mut self.signals) => self.handle_signal(signal),
                Some(command) = self.commands.recv() => self.handle_command(command),
                _ = self.clock.tick(), if armed.is_some() => {
                    if let Some(handle) = armed {
                        self.timer.tick_timer(handle);
                    }
                }
                _ = config_poll.tick() => self.check_config_reload(),
            }

            // A new handle means the previous timer was cancelled; restart the
            // period so its pending tick is never delivered.
            let now_armed = self.timer.armed_timer();
            if now_armed != armed {
                armed = now_armed;
                self.clock.reset();
            }

            if self.poll_period() != poll_period {
                poll_period = self.poll_period();
                info!("Config poll period is now {:?}", poll_period);
                config_poll = config_poll_interval(poll_period);
            }

            self.publish();

            if self.timer.phase() == Phase::Stopped {
                break;
            }
        }

        info!("Break reminder daemon stopped");
        Ok(())
    }

    fn handle_command(&mut self, command: Command) {
        debug!("Handling command: {:?}", command);

        match command {
            Command::Pause => self.timer.pause(),
            Command::Resume => self.timer.resume(),
            Command::TogglePause => self.timer.toggle_pause(),
            Command::Dismiss => self.timer.dismiss(),
            Command::Reset => self.timer.reset_timer(),
            Command::ShowReminder => self.timer.show_reminder(),
            Command::Stop => self.timer.stop(),
            Command::ApplySettings(settings) => self.timer.apply_config(settings),
            Command::Snapshot(reply) => {
                if reply.send(self.timer.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
        }
    }

    fn handle_signal(&mut self, signal: SignalType) {
        match signal {
            SignalType::Shutdown => {
                info!("Shutdown signal received, stopping timer");
                self.timer.stop();
            }
            SignalType::Reload => {
                info!("Reload signal received, reloading configuration");
                if let Err(e) = self.reload_config() {
                    error!("Failed to reload configuration: {:#}", e);
                }
            }
            SignalType::TogglePause => self.timer.toggle_pause(),
            SignalType::Dismiss => self.timer.dismiss(),
        }
    }

    /// Reload when the config file's modification time has advanced
    fn check_config_reload(&mut self) {
        let Some(last_modified) = self.last_config_modified else {
            self.last_config_modified = self.config_loader.modified_time();
            return;
        };

        match self.config_loader.is_config_modified(last_modified) {
            Ok(true) => {
                info!("Configuration file changed, reloading");
                if let Err(e) = self.reload_config() {
                    error!("Failed to reload configuration: {:#}", e);
                }
            }
            Ok(false) => {}
            Err(e) => warn!("Could not check configuration file: {}", e),
        }
    }

    /// Reload configuration and hand the new settings to the timer
    pub fn reload_config(&mut self) -> Result<()> {
        // Record the attempt first so a broken file is not retried every poll
        self.last_config_modified = self.config_loader.modified_time();

        let new_config = self.config_loader.reload_config()?;
        self.timer.apply_config(new_config.reminder_settings());
        for subscriber in &self.config_subscribers {
            subscriber.on_config_reloaded(&new_config);
        }
        self.config = new_config;

        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn poll_period(&self) -> Duration {
        Duration::from_secs(self.config.general.config_poll_seconds.max(1))
    }

    fn publish(&self) {
        self.snapshot_tx.send_if_modified(|current| {
            let snapshot = self.timer.snapshot();
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

fn config_poll_interval(period: Duration) -> Interval {
    let mut poll = interval_at(Instant::now() + period, period);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    poll
}

async fn next_signal(signals: &mut Option<mpsc::UnboundedReceiver<SignalType>>) -> Option<SignalType> {
    match signals {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

// Convenience constructor for production use
impl
    ReminderDaemon<
        crate::system::MacOSForegroundApp,
        IntervalClock,
        crate::system::StandardFileSystem,
    >
{
    /// Daemon over the real system, reusing the configuration loaded at startup
    pub fn new_production(config_path: PathBuf, config: Config) -> (Self, ReminderHandle) {
        Self::with_config(
            crate::system::MacOSForegroundApp::new(),
            IntervalClock::default(),
            ConfigLoader::new_production(config_path),
            config,
        )
    }
}

/// Service installation utilities
pub struct ServiceInstaller;

impl ServiceInstaller {
    const LABEL: &'static str = "com.breakreminder.daemon";

    /// Install the daemon as a macOS LaunchAgent
    pub fn install_launch_agent(config_path: Option<&str>) -> Result<PathBuf> {
        info!("Installing macOS LaunchAgent");

        let current_exe = std::env::current_exe().context("Failed to locate executable")?;
        let plist_content =
            Self::generate_launch_agent_plist(&current_exe.to_string_lossy(), config_path);
        let plist_path = Self::get_launch_agent_path()?;

        if let Some(parent) = plist_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&plist_path, plist_content)
            .with_context(|| format!("Failed to write {}", plist_path.display()))?;

        info!("LaunchAgent installed to: {}", plist_path.display());
        info!(
            "To load the service, run: launchctl load {}",
            plist_path.display()
        );

        Ok(plist_path)
    }

    /// Uninstall the LaunchAgent
    pub fn uninstall_launch_agent() -> Result<()> {
        info!("Uninstalling macOS LaunchAgent");

        let plist_path = Self::get_launch_agent_path()?;

        if plist_path.exists() {
            std::fs::remove_file(&plist_path)?;
            info!("LaunchAgent removed from: {}", plist_path.display());
            info!(
                "To unload the service, run: launchctl unload {}",
                plist_path.display()
            );
        } else {
            warn!("LaunchAgent plist not found at: {}", plist_path.display());
        }

        Ok(())
    }

    pub fn generate_launch_agent_plist(exe_path: &str, config_path: Option<&str>) -> String {
        let label = Self::LABEL;
        let config_args = match config_path {
            Some(path) => format!(
                "\n        <string>--config</string>\n        <string>{path}</string>"
            ),
            None => String::new(),
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{label}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{exe_path}</string>{config_args}
        <string>daemon</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <true/>
    <key>StandardOutPath</key>
    <string>/tmp/break-reminder.log</string>
    <key>StandardErrorPath</key>
    <string>/tmp/break-reminder.err</string>
</dict>
</plist>"#
        )
    }

    fn get_launch_agent_path() -> Result<PathBuf> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?;
        Ok(home_dir.join(format!("Library/LaunchAgents/{}.plist", Self::LABEL)))
    }
}
