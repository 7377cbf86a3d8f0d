//! Service configuration for the crashd bus layer.
//!
//! Loaded from a TOML file at startup; every section falls back to
//! built-in defaults so a missing or partial file still yields a
//! runnable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default well-known name the daemon claims on the system bus.
pub const DEFAULT_BUS_NAME: &str = "org.crashd.Daemon";

/// Default object path the daemon registers its methods under.
pub const DEFAULT_OBJECT_PATH: &str = "/org/crashd/Daemon";

/// Default interface name for methods and signals.
pub const DEFAULT_INTERFACE: &str = "org.crashd.Daemon";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bus: BusSettings,
    pub log: LogSettings,
}

/// Identity the service presents on the message bus.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BusSettings {
    /// Well-known bus name to request at startup
    pub name: String,
    /// Object path the dispatch table is registered under
    pub object_path: String,
    /// Interface name stamped on emitted signals
    pub interface: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive in `tracing_subscriber::EnvFilter` syntax
    pub filter: String,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_BUS_NAME.to_owned(),
            object_path: DEFAULT_OBJECT_PATH.to_owned(),
            interface: DEFAULT_INTERFACE.to_owned(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}
