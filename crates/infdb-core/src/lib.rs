pub mod app_config;
pub mod config;
pub mod fields;
pub mod influencers;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use fields::Field;
pub use influencers::{InfluencerStatus, NewInfluencer, Platform, UserRole};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid platform: {0}")]
    InvalidPlatform(String),
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
}
