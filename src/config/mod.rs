//! Environment-driven configuration

pub mod settings;

pub use settings::{AlertConfig, ConfigError};
