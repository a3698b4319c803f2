//! Layered configuration for Ferrule.
//!
//! This crate loads application settings into a single tree and binds
//! sections of it onto typed structs:
//! - TOML and JSON configuration files
//! - `.env` files via `dotenvy`
//! - Environment variable overrides (`PREFIX__SECTION__KEY`)
//! - Layered configuration (defaults → file → env), deep-merged
//!
//! # Example
//!
//! ```no_run
//! use ferrule_config::{ConfigLoader, RuntimeSettings};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct MailSettings {
//!     host: String,
//!     port: u16,
//! }
//!
//! # fn main() -> Result<(), ferrule_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("settings.toml")?
//!     .with_dotenv()?
//!     .with_env_prefix("FERRULE")
//!     .load()?;
//!
//! let mail: MailSettings = config.configure("services.mail")?;
//! let runtime = RuntimeSettings::from_configuration(&config)?;
//! println!("mail relay {}:{}, log level {}", mail.host, mail.port, runtime.logging.level);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [ferrule.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [ferrule.services]
//! auto_register = true
//!
//! [services.mail]
//! host = "smtp.local"
//! port = 2525
//! ```
//!
//! # Environment Variables
//!
//! With prefix `FERRULE`:
//!
//! ```bash
//! FERRULE__FERRULE__LOGGING__LEVEL=debug
//! FERRULE__SERVICES__MAIL__PORT=587
//! ```

#![doc(html_root_url = "https://docs.rs/ferrule-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod configuration;
mod error;
mod loader;
mod settings;

pub use configuration::{Configuration, PATH_DELIMITER};
pub use error::{ConfigError, ConfigResult};
pub use loader::{merge, ConfigLoader, Format, ENV_SEPARATOR};
pub use settings::{LogFormat, LoggingSettings, RuntimeSettings, ServiceSettings};
