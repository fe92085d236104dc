//! Configuration management for the Shamba Advisory Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SHAMBA_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Climate risk engine configuration
    pub climate: ClimateConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClimateConfig {
    /// Days of crowdsourced rain reports considered by the fusion engine
    pub rain_window_days: i64,

    /// Default forecast horizon in months
    pub default_horizon_months: u32,

    /// Agronomic optimum on the 0-100 soil moisture index
    pub soil_optimum_index: f64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SHAMBA_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("climate.rain_window_days", 14)?
            .set_default("climate.default_horizon_months", 3)?
            .set_default("climate.soil_optimum_index", 60.0)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SHAMBA_ prefix)
            .add_source(
                Environment::with_prefix("SHAMBA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            rain_window_days: 14,
            default_horizon_months: 3,
            soil_optimum_index: 60.0,
        }
    }
}
