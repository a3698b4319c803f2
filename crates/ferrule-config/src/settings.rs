//! Settings the runtime itself reads from configuration.

use serde::{Deserialize, Serialize};

use crate::{ConfigResult, Configuration};

/// Runtime settings, read from the `ferrule` section.
///
/// # Example
///
/// ```
/// use ferrule_config::{Configuration, LogFormat, RuntimeSettings};
/// use serde_json::json;
///
/// let config = Configuration::new(json!({
///     "ferrule": { "logging": { "format": "json" } }
/// }));
///
/// let settings = RuntimeSettings::from_configuration(&config).unwrap();
/// assert_eq!(settings.logging.format, LogFormat::Json);
/// assert_eq!(settings.logging.level, "info");
/// assert!(settings.services.auto_register);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Service container settings.
    pub services: ServiceSettings,
}

impl RuntimeSettings {
    /// Section the settings are read from.
    pub const SECTION: &'static str = "ferrule";

    /// Reads the settings, falling back to defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSection`](crate::ConfigError::InvalidSection)
    /// if the section is malformed.
    pub fn from_configuration(config: &Configuration) -> ConfigResult<Self> {
        config.configure(Self::SECTION)
    }

    /// Development preset: debug level, pretty output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingSettings {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ..LoggingSettings::default()
            },
            ..Self::default()
        }
    }

    /// Production preset: info level, JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LoggingSettings {
                format: LogFormat::Json,
                ..LoggingSettings::default()
            },
            ..Self::default()
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Whether logging is initialised at all.
    pub enabled: bool,
    /// Default level filter, overridden by `RUST_LOG`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Service container settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Whether auto-built dependencies are registered for reuse within a
    /// request scope.
    pub auto_register: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            auto_register: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use serde_json::json;

    #[test]
    fn test_defaults_when_section_missing() {
        let settings = RuntimeSettings::from_configuration(&Configuration::default()).unwrap();
        assert_eq!(settings, RuntimeSettings::default());
        assert!(settings.logging.enabled);
        assert_eq!(settings.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_section() {
        let config = Configuration::new(json!({
            "ferrule": { "services": { "auto_register": false } }
        }));
        let settings = RuntimeSettings::from_configuration(&config).unwrap();
        assert!(!settings.services.auto_register);
        assert_eq!(settings.logging, LoggingSettings::default());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let config = Configuration::new(json!({
            "ferrule": { "logging": { "format": "xml" } }
        }));
        let err = RuntimeSettings::from_configuration(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSection { .. }));
    }

    #[test]
    fn test_presets() {
        assert_eq!(RuntimeSettings::development().logging.level, "debug");
        assert_eq!(RuntimeSettings::production().logging.format, LogFormat::Json);
        assert!(RuntimeSettings::production().services.auto_register);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml = toml::to_string(&RuntimeSettings::production()).unwrap();
        let parsed: RuntimeSettings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, RuntimeSettings::production());
    }
}
