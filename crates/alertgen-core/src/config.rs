//! Configuration management for alertgen
//!
//! Values are layered, highest priority first:
//! - `ALERTGEN__*` environment variables
//! - the file named by `ALERTGEN_CONFIG`
//! - `./config/alertgen.{yaml,toml,json}`
//! - built-in defaults

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AlertgenConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub run: RunDefaults,
}

impl AlertgenConfig {
    /// Load configuration from every source, see module docs for precedence.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::set_defaults(Config::builder())?;

        builder = builder.add_source(File::with_name("./config/alertgen").required(false));

        if let Ok(config_path) = std::env::var("ALERTGEN_CONFIG") {
            builder = builder.add_source(File::with_name(&config_path).required(false));
        }

        // Example: ALERTGEN__PROVIDER__API_KEY=abc123
        builder = builder.add_source(
            Environment::with_prefix("ALERTGEN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: AlertgenConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("provider.request_timeout_secs", 10)?
            .set_default("run.scenario", "escalating")?
            .set_default("run.count", 100)?
            .set_default("run.interval_ms", 100)?
            .set_default("run.concurrency", 10)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "provider.request_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.run.concurrency == 0 {
            return Err(ConfigError::Message(
                "run.concurrency must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from a specific file path, on top of the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: AlertgenConfig = Self::set_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        config.validate()?;

        Ok(config)
    }
}

/// Alert sink connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Provider name: opsgenie, pagerduty or mock
    #[serde(default)]
    pub name: Option<String>,

    /// API key or routing key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Replaces the provider's default endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: None,
            api_key: None,
            endpoint: None,
            request_timeout_secs: 10,
        }
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Defaults for scenario runs when flags are omitted
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunDefaults {
    pub scenario: String,
    pub count: usize,
    pub interval_ms: u64,
    pub concurrency: usize,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            scenario: "escalating".to_string(),
            count: 100,
            interval_ms: 100,
            concurrency: 10,
        }
    }
}
