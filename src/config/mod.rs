pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{
    BlockingConfig, Config, GeneralConfig, MAX_INTERVAL_MINUTES, NotificationConfig,
};

/// Collaborator that follows configuration reloads
pub trait ConfigSubscriber: Send + Sync {
    fn on_config_reloaded(&self, config: &Config);
}
