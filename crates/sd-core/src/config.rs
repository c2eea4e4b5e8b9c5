//! Configuration types and loading
//!
//! Defaults are layered under an optional config file and `STRATDASH_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AppConfig {
    /// Progress engine settings
    pub progress: ProgressConfig,

    /// Logging output settings
    pub logging: LoggingConfig,

    /// Dataset snapshot location
    pub dataset: DatasetConfig,

    /// Instance-specific settings
    pub instance: InstanceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProgressConfig {
    /// Number of monthly periods projected by the forecaster
    pub forecast_horizon: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Fallback filter when `RUST_LOG` is not set
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DatasetConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct InstanceConfig {
    /// Application title
    pub app_title: String,
    /// Default locale
    pub default_locale: String,
    /// Time zone
    pub timezone: String,
    /// Date format
    pub date_format: String,
    /// KPI units rendered as money in reports
    pub currency_units: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            progress: ProgressConfig {
                forecast_horizon: 6,
            },
            logging: LoggingConfig {
                format: LogFormat::Text,
                filter: "info,sd_services=debug,stratdash=debug".to_string(),
            },
            dataset: DatasetConfig {
                path: "stratdash.json".to_string(),
            },
            instance: InstanceConfig {
                app_title: "Stratdash".to_string(),
                default_locale: "en".to_string(),
                timezone: "UTC".to_string(),
                date_format: "%Y-%m-%d".to_string(),
                currency_units: vec![
                    "$".to_string(),
                    "R$".to_string(),
                    "€".to_string(),
                    "USD".to_string(),
                    "BRL".to_string(),
                    "EUR".to_string(),
                ],
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Config file error: {0}")]
    FileError(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::FileError(err.to_string())
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the optional file, then environment.
    ///
    /// Nested keys use a double underscore, e.g. `STRATDASH_PROGRESS__FORECAST_HORIZON=12`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("STRATDASH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        config.apply_env_shortcuts()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document layered over the defaults
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Flat environment variables kept for convenience
    fn apply_env_shortcuts(&mut self) -> Result<(), ConfigError> {
        if let Ok(path) = std::env::var("STRATDASH_DATASET_PATH") {
            self.dataset.path = path;
        }
        if let Ok(format) = std::env::var("STRATDASH_LOG_FORMAT") {
            self.logging.format = match format.as_str() {
                "json" => LogFormat::Json,
                "text" => LogFormat::Text,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "STRATDASH_LOG_FORMAT".to_string(),
                        message: format!("unknown format '{}'", other),
                    })
                }
            };
        }
        if let Ok(horizon) = std::env::var("STRATDASH_FORECAST_HORIZON") {
            self.progress.forecast_horizon =
                horizon.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "STRATDASH_FORECAST_HORIZON".to_string(),
                    message: format!("'{}' is not a positive integer", horizon),
                })?;
        }
        if let Ok(title) = std::env::var("STRATDASH_APP_TITLE") {
            self.instance.app_title = title;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.progress.forecast_horizon == 0 {
            return Err(ConfigError::InvalidValue {
                key: "progress.forecast_horizon".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Whether a KPI unit should be rendered as money
    pub fn is_currency_unit(&self, unit: &str) -> bool {
        let unit = unit.trim();
        self.instance
            .currency_units
            .iter()
            .any(|u| u.eq_ignore_ascii_case(unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.progress.forecast_horizon, 6);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.dataset.path, "stratdash.json");
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [progress]
            forecast_horizon = 12

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.progress.forecast_horizon, 12);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.instance.app_title, "Stratdash");
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let result = AppConfig::from_toml("[progress]\nforecast_horizon = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_currency_units() {
        let config = AppConfig::default();
        assert!(config.is_currency_unit("usd"));
        assert!(config.is_currency_unit(" R$ "));
        assert!(!config.is_currency_unit("%"));
    }
}
