//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, `.env` files, and environment
//! variables.

use std::env;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::{ConfigError, ConfigResult, Configuration};

/// Separator between keys in environment variable names.
pub const ENV_SEPARATOR: &str = "__";

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl Format {
    /// Picks the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::unsupported_format(path.display().to_string())),
        }
    }

    fn parse(self, content: &str) -> ConfigResult<Value> {
        Ok(match self {
            Self::Toml => toml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }
}

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers
/// deep-merging over earlier ones:
/// 1. Programmatic defaults
/// 2. Configuration files (TOML or JSON)
/// 3. `.env` files, which only populate the process environment
/// 4. Environment variables with a prefix
///
/// # Example
///
/// ```no_run
/// use ferrule_config::ConfigLoader;
/// use serde_json::json;
///
/// # fn main() -> Result<(), ferrule_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults(json!({ "ferrule": { "logging": { "level": "info" } } }))
///     .with_optional_file("settings.toml")?
///     .with_dotenv()?
///     .with_env_prefix("FERRULE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    tree: Value,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a new, empty configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge programmatic defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use ferrule_config::ConfigLoader;
    /// use serde_json::json;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_defaults(json!({ "app": { "name": "shop" } }))
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.get::<String>("app.name").unwrap().as_deref(), Some("shop"));
    /// ```
    #[must_use]
    pub fn with_defaults(mut self, defaults: Value) -> Self {
        merge(&mut self.tree, defaults);
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is determined by the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The extension is neither `.toml` nor `.json`
    /// - The file contains invalid TOML/JSON
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = Format::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        tracing::debug!(path = %path.display(), ?format, "loading configuration file");
        self.with_str(&content, format)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or
    /// parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            tracing::debug!(path = %path.as_ref().display(), "optional configuration file absent");
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use ferrule_config::{ConfigLoader, Format};
    ///
    /// let toml = r#"
    ///     [ferrule.logging]
    ///     level = "debug"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_str(toml, Format::Toml)
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     config.get::<String>("ferrule.logging.level").unwrap().as_deref(),
    ///     Some("debug")
    /// );
    /// ```
    pub fn with_str(mut self, content: &str, format: Format) -> ConfigResult<Self> {
        let layer = format.parse(content)?;
        merge(&mut self.tree, layer);
        Ok(self)
    }

    /// Load a `.env` file from the current directory or its parents.
    ///
    /// A missing file is ignored. Variables already set in the process
    /// environment are not overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> ConfigResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "loaded environment file");
                Ok(self)
            }
            Err(err) if err.not_found() => Ok(self),
            Err(err) => Err(err.into()),
        }
    }

    /// Load a specific `.env` file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or cannot be parsed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> ConfigResult<Self> {
        dotenvy::from_path(path.as_ref())?;
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`. For
    /// example, with prefix `FERRULE`, `FERRULE__LOGGING__LEVEL=debug`
    /// sets `logging.level`. Keys are lower-cased. Values are parsed as
    /// booleans, integers or floats where possible and kept as strings
    /// otherwise.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides if a prefix was set.
    pub fn load(mut self) -> ConfigResult<Configuration> {
        if let Some(prefix) = self.env_prefix.take() {
            apply_env_overrides(&mut self.tree, &prefix, env::vars());
        }
        Ok(Configuration::new(self.tree))
    }
}

/// Deep-merges `layer` into `base`.
///
/// Objects merge key by key; any other value replaces what was there.
pub fn merge(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn apply_env_overrides<I>(tree: &mut Value, prefix: &str, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    let head = format!("{prefix}{ENV_SEPARATOR}");
    for (name, raw) in vars {
        let Some(rest) = name.strip_prefix(&head) else {
            continue;
        };
        let keys: Vec<String> = rest.split(ENV_SEPARATOR).map(str::to_lowercase).collect();
        if keys.iter().any(String::is_empty) {
            tracing::warn!(var = %name, "ignoring malformed configuration override");
            continue;
        }
        tracing::trace!(var = %name, "applying configuration override");
        set_path(tree, &keys, parse_env_value(&raw));
    }
}

fn set_path(tree: &mut Value, keys: &[String], value: Value) {
    let Some((last, parents)) = keys.split_last() else {
        return;
    };
    let mut current = tree;
    for key in parents {
        let Some(map) = ensure_object(current) else {
            return;
        };
        current = map
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Some(map) = ensure_object(current) {
        map.insert(last.clone(), value);
    }
}

fn ensure_object(value: &mut Value) -> Option<&mut Map<String, Value>> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut()
}

fn parse_env_value(raw: &str) -> Value {
    if let Ok(flag) = raw.parse::<bool>() {
        return Value::Bool(flag);
    }
    if let Ok(number) = raw.parse::<i64>() {
        return Value::from(number);
    }
    if let Ok(number) = raw.parse::<f64>() {
        if number.is_finite() {
            return Value::from(number);
        }
    }
    Value::String(raw.to_owned())
}
