use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Zone applied to records whose start field carries no TZID.
    pub default_timezone: String,
    /// Pretty-print the JSON written to stdout.
    pub pretty: bool,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional `config.toml`.
    /// Environment variables take precedence over the defaults; the TOML file
    /// takes precedence over both.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::builder()?
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.level", "info")?
            .set_default("import.default_timezone", "UTC")?
            .set_default("import.pretty", true)?
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            ))
    }

    /// ## Summary
    /// Rejects settings the importer cannot act on.
    ///
    /// ## Errors
    /// Returns [`CoreError::ConfigError`] if the default timezone is blank.
    pub fn validate(&self) -> CoreResult<()> {
        if self.import.default_timezone.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "import.default_timezone must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading, deserializing or validating the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    settings.validate()?;
    tracing::debug!(?settings, "Configuration loaded");
    Ok(settings)
}
