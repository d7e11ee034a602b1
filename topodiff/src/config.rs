//! Settings loaded from a TOML file.
//!
//! ```toml
//! store = "/var/lib/topodiff"
//! timeout = 5
//! serialize_mode = "corrected"
//! parsers = ["olsr", "batman-adv"]
//! ```
//!
//! Every listed parser must be registered, which is checked while loading.

use crate::fetcher::DEFAULT_TIMEOUT;
use crate::parsers::{ParserRegistry, UnknownParserError};
use crate::serializer::SerializeMode;

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors while loading the settings
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file cannot be read
    #[error("Cannot read {path}: {source}")]
    Io {
        /// Path of the file
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// The configuration file is not valid TOML
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// A listed parser is not registered
    #[error("{0}")]
    UnknownParser(#[from] UnknownParserError),
    /// The timeout must be at least one second
    #[error("Invalid timeout: {0} seconds")]
    InvalidTimeout(u64),
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory of the topology repository
    pub store: PathBuf,
    /// Timeout for fetching a snapshot, in seconds
    pub timeout: u64,
    /// How stored topologies are rendered
    pub serialize_mode: SerializeMode,
    /// Parsers topologies may use. Empty means every registered parser.
    pub parsers: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: PathBuf::from("topologies"),
            timeout: DEFAULT_TIMEOUT.as_secs(),
            serialize_mode: SerializeMode::default(),
            parsers: Vec::new(),
        }
    }
}

impl Settings {
    /// Parse and validate settings
    pub fn from_toml_str(s: &str, registry: &ParserRegistry) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(s)?;
        settings.validate(registry)?;
        Ok(settings)
    }

    /// Read, parse and validate the settings file at `path`
    pub fn load(path: impl AsRef<Path>, registry: &ParserRegistry) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data, registry)
    }

    /// Check the timeout and that every listed parser is registered
    pub fn validate(&self, registry: &ParserRegistry) -> Result<(), ConfigError> {
        if self.timeout == 0 {
            return Err(ConfigError::InvalidTimeout(self.timeout));
        }
        for id in self.parsers.iter() {
            registry.get(id)?;
        }
        Ok(())
    }

    /// The fetch timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// The registry reduced to the allowed parsers
    pub fn registry(&self, registry: &ParserRegistry) -> Result<ParserRegistry, ConfigError> {
        if self.parsers.is_empty() {
            return Ok(registry.clone());
        }
        Ok(registry.restrict(&self.parsers)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("", &ParserRegistry::with_builtins()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert_eq!(settings.serialize_mode, SerializeMode::Corrected);
    }

    #[test]
    fn test_parse() {
        let settings = Settings::from_toml_str(
            r#"
                store = "/tmp/topologies"
                timeout = 10
                serialize_mode = "faithful"
                parsers = ["olsr"]
            "#,
            &ParserRegistry::with_builtins(),
        )
        .unwrap();
        assert_eq!(settings.store, PathBuf::from("/tmp/topologies"));
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert_eq!(settings.serialize_mode, SerializeMode::Faithful);
        let registry = settings.registry(&ParserRegistry::with_builtins()).unwrap();
        assert!(registry.contains("olsr"));
        assert!(!registry.contains("netjson"));
    }

    #[test]
    fn test_unknown_parser_fails_fast() {
        assert!(matches!(
            Settings::from_toml_str(
                "parsers = [\"netdiff.OlsrParser\"]",
                &ParserRegistry::with_builtins()
            ),
            Err(ConfigError::UnknownParser(_))
        ));
    }

    #[test]
    fn test_invalid() {
        let registry = ParserRegistry::with_builtins();
        assert!(matches!(
            Settings::from_toml_str("timeout = 0", &registry),
            Err(ConfigError::InvalidTimeout(0))
        ));
        assert!(matches!(
            Settings::from_toml_str("retries = 3", &registry),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            Settings::load("/nonexistent/topodiff.toml", &registry),
            Err(ConfigError::Io { .. })
        ));
    }
}
