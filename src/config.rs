//! Layered configuration: an optional TOML file under environment variables.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [errors]
//! failure_status = 200
//! ```
//!
//! Every key can be overridden from the environment, e.g.
//! `CONFIGURATOR__ERRORS__FAILURE_STATUS=500`.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::status::Status;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "CONFIGURATOR_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "configurator.toml";
const ENV_PREFIX: &str = "CONFIGURATOR";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub logging: LoggingSection,
    pub errors: ErrorSection,
}

impl AppConfig {
    /// Loads `$CONFIGURATOR_CONFIG` (default `configurator.toml`, skipped when
    /// absent) and applies `CONFIGURATOR__*` overrides.
    pub fn load() -> Result<Self, Error> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let mut builder = config::Config::builder();

        if path.exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.failure_status()?;
        Ok(config)
    }

    /// Status of the generic failure body.
    pub fn failure_status(&self) -> Result<Status, Error> {
        Status::try_from(self.errors.failure_status).map_err(Error::InvalidStatus)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl ServerSection {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ErrorSection {
    /// Status sent with `{"error":"Unexpected server error. ..."}`. The
    /// deployed service has always answered `200`; `500` is the correct one.
    pub failure_status: u16,
}

impl Default for ErrorSection {
    fn default() -> Self {
        Self { failure_status: 200 }
    }
}
