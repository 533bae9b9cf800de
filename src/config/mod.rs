//! Configuration management.
//!
//! Supports configuration from:
//! - A key-value [`ConfigStore`] supplied by the deploy host
//! - TOML config files (for the CLI)
//! - CLI arguments, merged over the file
//!
//! Recognized keys use the host's camelCase names:
//!
//! | key             | default                                  |
//! |-----------------|------------------------------------------|
//! | `filePattern`   | [`DEFAULT_FILE_PATTERN`]                 |
//! | `ignorePattern` | none                                     |
//! | `compression`   | `["best"]`                               |
//! | `zopfli`        | `false`                                  |
//! | `keep`          | `false`                                  |
//! | `distDir`       | the context's dist directory             |
//! | `distFiles`     | the context's dist file list             |

mod resolver;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::{Project, Targets};
use crate::error::{CompressError, Result};

pub use resolver::{Resolution, RunConfig, CONFIG_KEYS, DEFAULT_FILE_PATTERN};

/// Read access to the host's configuration values
pub trait ConfigStore {
    /// Look up a key; `None` means the key was never set
    fn get(&self, key: &str) -> Option<&Value>;
}

/// In-memory config store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigMap(BTreeMap<String, Value>);

impl ConfigMap {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a key, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Parse a flat TOML table of config keys
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Number of keys set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no keys are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `other` on top of this store (other's keys win)
    pub fn merge(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }
}

impl ConfigStore for ConfigMap {
    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Project section of a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default)]
    pub name: Option<String>,

    /// Browser targets
    #[serde(default)]
    pub browsers: Option<Vec<String>>,
}

/// Config file used by the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Plugin keys
    #[serde(default)]
    pub compress: ConfigMap,

    /// Project descriptor
    #[serde(default)]
    pub project: ProjectConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            CompressError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CompressError::Config(format!("Failed to parse config: {e}")))
    }

    /// Merge with another config (other takes precedence key by key)
    pub fn merge(self, other: Self) -> Self {
        Self {
            compress: self.compress.merge(other.compress),
            project: ProjectConfig {
                name: other.project.name.or(self.project.name),
                browsers: other.project.browsers.or(self.project.browsers),
            },
        }
    }

    /// Project descriptor built from the `[project]` section
    pub fn project(&self) -> Project {
        Project {
            name: self.project.name.clone(),
            targets: self.project.browsers.clone().map(|browsers| Targets { browsers }),
        }
    }
}
