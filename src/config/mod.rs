//! Configuration module for the songs library
//!
//! Settings are layered: serde defaults, then an optional config file, then
//! `SONGS_`-prefixed environment variables.

mod app_config;

pub use app_config::{AppConfig, DatabaseConfig, EnrichmentConfig, ServerConfig};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "songs.toml";

/// Prefix for environment overrides, e.g. `SONGS_DATABASE__URL`
pub const ENV_PREFIX: &str = "SONGS";
