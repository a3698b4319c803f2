//! Loaded configuration tree and typed section binding.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ConfigError, ConfigResult};

/// Separator between keys in a section path.
pub const PATH_DELIMITER: char = '.';

/// A loaded configuration tree.
///
/// Sections are addressed with dot-delimited paths such as
/// `"database.pool"`. Use [`configure`](Self::configure) to bind a section
/// onto a typed settings struct.
///
/// # Example
///
/// ```
/// use ferrule_config::Configuration;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Debug, Default, Deserialize)]
/// #[serde(default)]
/// struct Pool {
///     size: u32,
///     idle_timeout_secs: u64,
/// }
///
/// let config = Configuration::new(json!({
///     "database": { "pool": { "size": 8 } }
/// }));
///
/// let pool: Pool = config.configure("database.pool").unwrap();
/// assert_eq!(pool.size, 8);
/// assert_eq!(pool.idle_timeout_secs, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    root: Value,
}

impl Configuration {
    /// Wraps an already-merged tree.
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// The whole tree.
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Returns true if nothing was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.root {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// The sub-tree at `path`, or `None` if any key along it is missing.
    ///
    /// An empty path returns the whole tree.
    #[must_use]
    pub fn section(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(&self.root);
        }
        path.split(PATH_DELIMITER)
            .try_fold(&self.root, |current, key| current.as_object()?.get(key))
    }

    /// The section at `path` keyed by the last key reached.
    ///
    /// Walking stops early at the first scalar, which is returned under its
    /// own key. A missing key yields that key mapped to an empty object, and
    /// an empty tree yields an empty object.
    ///
    /// ```
    /// use ferrule_config::Configuration;
    /// use serde_json::json;
    ///
    /// let config = Configuration::new(json!({ "app": { "name": "shop", "limits": { "rps": 10 } } }));
    ///
    /// assert_eq!(config.section_entry("app.limits"), json!({ "limits": { "rps": 10 } }));
    /// assert_eq!(config.section_entry("app.name.first"), json!({ "name": "shop" }));
    /// assert_eq!(config.section_entry("app.missing"), json!({ "missing": {} }));
    /// ```
    #[must_use]
    pub fn section_entry(&self, path: &str) -> Value {
        if self.is_empty() {
            return Value::Object(Map::new());
        }

        let mut current = &self.root;
        let mut last_key = "";
        for key in path.split(PATH_DELIMITER) {
            let Some(section) = current.as_object().and_then(|map| map.get(key)) else {
                return single_entry(key, Value::Object(Map::new()));
            };
            if !section.is_object() {
                return single_entry(key, section.clone());
            }
            current = section;
            last_key = key;
        }
        single_entry(last_key, current.clone())
    }

    /// Binds the section at `path` onto `T`.
    ///
    /// A missing or null section yields `T::default()`. Fields absent from
    /// the section fall back to whatever `T`'s serde attributes say, so
    /// settings types normally carry `#[serde(default)]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSection`] if the section's shape does
    /// not match `T`.
    pub fn configure<T>(&self, path: &str) -> ConfigResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.section(path) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(section) => serde_json::from_value(section.clone())
                .map_err(|source| ConfigError::invalid_section(path, source)),
        }
    }

    /// Reads a single value, if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSection`] if the value does not
    /// deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> ConfigResult<Option<T>> {
        self.section(path)
            .map(|value| {
                serde_json::from_value(value.clone())
                    .map_err(|source| ConfigError::invalid_section(path, source))
            })
            .transpose()
    }
}

impl From<Value> for Configuration {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_owned(), value);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Mail {
        host: String,
        port: u16,
        tls: TlsMode,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum TlsMode {
        #[default]
        Off,
        Required,
    }

    fn sample() -> Configuration {
        Configuration::new(json!({
            "services": {
                "mail": { "host": "smtp.local", "port": 2525, "tls": "required" },
                "retries": 3
            }
        }))
    }

    #[test]
    fn test_section_walks_nested_keys() {
        let config = sample();
        assert_eq!(config.section("services.retries"), Some(&json!(3)));
        assert_eq!(
            config.section("services.mail.host"),
            Some(&json!("smtp.local"))
        );
        assert!(config.section("services.queue").is_none());
        assert!(config.section("services.retries.max").is_none());
        assert_eq!(config.section(""), Some(config.root()));
    }

    #[test]
    fn test_section_entry_shapes() {
        let config = sample();
        assert_eq!(
            config.section_entry("services.mail"),
            json!({ "mail": { "host": "smtp.local", "port": 2525, "tls": "required" } })
        );
        assert_eq!(config.section_entry("services.retries.max"), json!({ "retries": 3 }));
        assert_eq!(config.section_entry("services.queue"), json!({ "queue": {} }));
        assert_eq!(Configuration::default().section_entry("services"), json!({}));
    }

    #[test]
    fn test_configure_binds_section() {
        let mail: Mail = sample().configure("services.mail").unwrap();
        assert_eq!(
            mail,
            Mail {
                host: "smtp.local".into(),
                port: 2525,
                tls: TlsMode::Required,
            }
        );
    }

    #[test]
    fn test_configure_missing_section_is_default() {
        let mail: Mail = sample().configure("services.queue").unwrap();
        assert_eq!(mail, Mail::default());
    }

    #[test]
    fn test_configure_partial_section_uses_defaults() {
        let config = Configuration::new(json!({ "mail": { "host": "relay" } }));
        let mail: Mail = config.configure("mail").unwrap();
        assert_eq!(mail.host, "relay");
        assert_eq!(mail.port, 0);
        assert_eq!(mail.tls, TlsMode::Off);
    }

    #[test]
    fn test_configure_type_mismatch() {
        let config = Configuration::new(json!({ "mail": { "port": "not-a-port" } }));
        let err = config.configure::<Mail>("mail").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSection { ref path, .. } if path == "mail"));
    }

    #[test]
    fn test_get_scalar() {
        let config = sample();
        assert_eq!(config.get::<u32>("services.retries").unwrap(), Some(3));
        assert_eq!(config.get::<u32>("services.missing").unwrap(), None);
        assert!(config.get::<u32>("services.mail.host").is_err());
    }

    #[test]
    fn test_is_empty() {
        assert!(Configuration::default().is_empty());
        assert!(Configuration::new(json!({})).is_empty());
        assert!(!sample().is_empty());
    }
}
