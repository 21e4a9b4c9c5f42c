//! Binder configuration.
//!
//! Loaded from YAML; every field is optional.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! enum_seed_policy: strict
//! numeric_widening: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or saving a [`BinderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// What to do when an enum-typed seed argument does not resolve to a
/// constant while instantiating a group through a factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnumSeedPolicy {
    /// Log a warning and pass the raw value to the factory (the default).
    #[default]
    Fallback,
    /// Fail the instantiation.
    Strict,
}

/// Settings for a [`Binder`](crate::Binder).
///
/// # Examples
///
/// ```
/// use argbind::{BinderConfig, EnumSeedPolicy};
///
/// let config = BinderConfig::from_yaml_str("enum_seed_policy: strict\n").unwrap();
/// assert_eq!(config.enum_seed_policy, EnumSeedPolicy::Strict);
/// assert!(config.numeric_widening);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Configuration format version.
    pub version: String,
    /// Handling of unresolvable enum seeds.
    pub enum_seed_policy: EnumSeedPolicy,
    /// Allow Java-style primitive widening (`int` → `long`, ...) when a
    /// value's kind differs from the member's.
    pub numeric_widening: bool,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            enum_seed_policy: EnumSeedPolicy::default(),
            numeric_widening: true,
        }
    }
}

impl BinderConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written, or
    /// [`ConfigError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Parses configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if parsing fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
