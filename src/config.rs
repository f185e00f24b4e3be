//! Codec configuration.
//!
//! Loads codec options from YAML, or from `CLOUDEVENT_*` environment
//! variables with defaults for anything unset.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What encoding does when an extension attribute uses a standard
/// attribute name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservedKeyPolicy {
    /// Fail the encode with [`crate::EncodeError::ReservedExtensionKey`].
    #[default]
    Reject,
    /// Let the extension entry replace the standard one. `data` and
    /// `data_base64` are still rejected.
    Overwrite,
}

impl FromStr for ReservedKeyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(ReservedKeyPolicy::Reject),
            "overwrite" => Ok(ReservedKeyPolicy::Overwrite),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_RESERVED_KEYS.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReservedKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservedKeyPolicy::Reject => write!(f, "reject"),
            ReservedKeyPolicy::Overwrite => write!(f, "overwrite"),
        }
    }
}

pub const ENV_RESERVED_KEYS: &str = "CLOUDEVENT_RESERVED_KEYS";
pub const ENV_PRETTY: &str = "CLOUDEVENT_PRETTY";

/// Options consulted by [`crate::CodecRegistry`] and the extension codec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Handling of extension keys that shadow standard attributes
    pub reserved_keys: ReservedKeyPolicy,

    /// Pretty-print JSON produced by the string entry points
    pub pretty: bool,
}

impl CodecConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Example
    /// ```ignore
    /// use cloudevent_json::CodecConfig;
    ///
    /// let config = CodecConfig::load_from_file("config/cloudevent.yaml")?;
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&contents)?;
        tracing::debug!("Loaded codec config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps an environment
    /// variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_RESERVED_KEYS) {
            config.reserved_keys = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_PRETTY) {
            config.pretty = parse_bool(ENV_PRETTY, &raw)?;
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
