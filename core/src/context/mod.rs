mod config;

pub use config::{APP_NAME, AppConfig, ConfigError};
