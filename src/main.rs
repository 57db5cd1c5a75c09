use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{Level, error, info, warn};

use break_reminder::config::Config;
use break_reminder::logging::{self, LoggingConfig};
use break_reminder::notifications::{DefaultReminderNotifier, MacOSNotificationSender};
use break_reminder::reminder::{DismissReason, ReminderEvent};
use break_reminder::service::{
    PidFile, ReminderDaemon, ServiceInstaller, SignalHandler, SignalType,
};
use break_reminder::system::{ForegroundAppInterface, MacOSForegroundApp};

#[derive(Parser)]
#[command(name = "break-reminder")]
#[command(about = "macOS break reminder that stays quiet while you present or meet")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reminder timer in the foreground
    Daemon,
    /// Validate configuration file
    CheckConfig,
    /// Print the bundle identifier of the frontmost application
    Frontmost,
    /// Pause or resume the running daemon
    Pause,
    /// Dismiss the reminder currently shown by the daemon
    Dismiss,
    /// Ask the running daemon to reload its configuration
    Reload,
    /// Stop the running daemon
    Stop,
    /// Send a test notification
    TestNotification,
    /// Install as a LaunchAgent that starts at login
    Install,
    /// Remove the LaunchAgent
    Uninstall,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config is read before logging so its level applies; errors surface below
    let config = Config::load(cli.config.as_deref());

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config
            .as_ref()
            .map(|c| logging::parse_level(&c.general.log_level))
            .unwrap_or(Level::INFO)
    };

    let is_daemon = matches!(cli.command, None | Some(Commands::Daemon));
    let logging_config = if is_daemon {
        LoggingConfig::daemon(level)
    } else {
        LoggingConfig::console(level)
    };
    let (_log_guard, log_dir) = logging::initialize_logging(logging_config)?;

    match cli.command {
        None | Some(Commands::Daemon) => {
            if cli.command.is_none() {
                info!("No command specified, running in daemon mode");
            }
            if let Some(dir) = log_dir {
                logging::cleanup_old_logs(&dir, 7)?;
            }
            run_daemon(cli.config.as_deref(), config?).await?;
        }
        Some(Commands::CheckConfig) => check_config(cli.config.as_deref(), config)?,
        Some(Commands::Frontmost) => show_frontmost()?,
        Some(Commands::Pause) => signal_daemon(SignalType::TogglePause)?,
        Some(Commands::Dismiss) => signal_daemon(SignalType::Dismiss)?,
        Some(Commands::Reload) => signal_daemon(SignalType::Reload)?,
        Some(Commands::Stop) => signal_daemon(SignalType::Shutdown)?,
        Some(Commands::TestNotification) => {
            DefaultReminderNotifier::new(&config?).test_notification()?;
        }
        Some(Commands::Install) => {
            let plist_path = ServiceInstaller::install_launch_agent(cli.config.as_deref())?;
            println!("LaunchAgent installed to {}", plist_path.display());
        }
        Some(Commands::Uninstall) => {
            ServiceInstaller::uninstall_launch_agent()?;
            println!("LaunchAgent removed");
        }
    }

    Ok(())
}

async fn run_daemon(config_path: Option<&str>, config: Config) -> Result<()> {
    info!("Starting daemon mode");

    let pid_file = PidFile::at_default_path()?;
    pid_file.acquire()?;

    let (signal_handler, signal_rx) = SignalHandler::channel();
    let signal_task = tokio::spawn(async move {
        if let Err(e) = signal_handler.listen_for_signals().await {
            error!("Signal handler failed: {:#}", e);
        }
    });

    let interval_minutes = config.general.interval_minutes;
    let (daemon, _handle) =
        ReminderDaemon::new_production(Config::resolve_path(config_path)?, config);
    let mut daemon = daemon.with_signals(signal_rx);
    daemon.add_notifier(MacOSNotificationSender);
    let console_task = tokio::spawn(print_events(daemon.subscribe_events()));

    println!("Break reminder started");
    println!("  Next break in {} minutes", interval_minutes);
    println!("  Press Ctrl+C to stop");

    let result = daemon.run().await;

    signal_task.abort();
    console_task.abort();
    if let Err(e) = pid_file.remove() {
        warn!("Failed to remove PID file: {:#}", e);
    }

    println!("Break reminder stopped");
    result
}

/// Console status lines for a daemon running in a terminal
async fn print_events(mut events: mpsc::UnboundedReceiver<ReminderEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            ReminderEvent::ReminderShown => println!("Time for a break!"),
            ReminderEvent::ReminderDismissed(DismissReason::TimedOut) => {
                println!("Break skipped, next one in the usual interval")
            }
            ReminderEvent::ReminderDismissed(_) => println!("Back to work"),
            ReminderEvent::Suppressed(app_id) => {
                println!("Break postponed while {} is in front", app_id)
            }
            ReminderEvent::Paused => println!("Paused"),
            ReminderEvent::Resumed => println!("Resumed"),
            _ => {}
        }
    }
}

fn check_config(config_path: Option<&str>, config: Result<Config>) -> Result<()> {
    info!("Validating configuration");

    let path = Config::resolve_path(config_path)?;
    println!("Configuration validation ({}):", path.display());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            println!("  ✗ {:#}", e);
            return Err(e);
        }
    };

    println!("  ✓ Configuration file parsed successfully");
    println!("  ✓ Break interval: {} minutes", config.general.interval_minutes);
    println!(
        "  ✓ Blocking: {} ({} apps)",
        if config.blocking.enabled { "enabled" } else { "disabled" },
        config.blocking.blocked_apps.len()
    );
    for app_id in &config.blocking.blocked_apps {
        println!("      - {}", app_id);
    }
    println!(
        "  ✓ Notifications: {}",
        if config.notifications.enabled { "enabled" } else { "disabled" }
    );

    Ok(())
}

fn show_frontmost() -> Result<()> {
    match MacOSForegroundApp::new().frontmost_app_id()? {
        Some(app_id) => println!("{}", app_id),
        None => println!("No frontmost application"),
    }
    Ok(())
}

fn signal_daemon(action: SignalType) -> Result<()> {
    let pid = PidFile::at_default_path()?.signal_daemon(action)?;
    println!("Sent {:?} request to daemon (PID {})", action, pid);
    Ok(())
}
