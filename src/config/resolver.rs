//! Resolves plugin options against their defaults.
//!
//! Every recognized key that is absent from the store falls back to its
//! default and is reported once, as `- Missing config: <key>, using default: <value>`.
//! An explicit `null` counts as set.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::ConfigStore;
use crate::codec::CompressionSelector;
use crate::error::{CompressError, Result};

/// Default include pattern: common static-asset extensions
pub const DEFAULT_FILE_PATTERN: &str =
    "**/*.{js,css,json,ico,map,xml,txt,svg,eot,ttf,woff,woff2}";

/// Recognized keys, in reporting order
pub const CONFIG_KEYS: [&str; 7] = [
    "filePattern",
    "ignorePattern",
    "compression",
    "zopfli",
    "keep",
    "distDir",
    "distFiles",
];

/// Fully resolved options for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Include glob
    pub file_pattern: String,
    /// Exclude glob
    pub ignore_pattern: Option<String>,
    /// Validated codec selector
    pub compression: CompressionSelector,
    /// Use the zopfli encoder for gzip
    pub zopfli: bool,
    /// Keep originals next to compressed siblings
    pub keep: bool,
    /// Base directory for relative paths
    pub dist_dir: PathBuf,
    /// Candidate relative paths
    pub dist_files: Vec<String>,
}

/// A resolved config together with the keys that fell back to defaults
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Resolved options
    pub config: RunConfig,
    /// Keys that were absent, in [`CONFIG_KEYS`] order
    pub defaulted: Vec<&'static str>,
}

impl RunConfig {
    /// Resolve options from a store.
    ///
    /// `dist_dir` and `dist_files` are the context-derived defaults for the
    /// keys of the same name. Defaulted keys are logged when `log_defaults` is
    /// set; validation errors are raised either way.
    pub fn resolve(
        store: &dyn ConfigStore,
        dist_dir: &Path,
        dist_files: &[String],
        log_defaults: bool,
    ) -> Result<Resolution> {
        let defaulted: Vec<&'static str> = CONFIG_KEYS
            .iter()
            .copied()
            .filter(|key| store.get(key).is_none())
            .collect();

        let keep = read_bool(store, "keep")?.unwrap_or(false);

        let config = RunConfig {
            file_pattern: read_string(store, "filePattern")?
                .flatten()
                .unwrap_or_else(|| DEFAULT_FILE_PATTERN.to_string()),
            ignore_pattern: read_string(store, "ignorePattern")?.flatten(),
            compression: read_compression(store, keep)?,
            zopfli: read_bool(store, "zopfli")?.unwrap_or(false),
            keep,
            dist_dir: read_string(store, "distDir")?
                .flatten()
                .map(PathBuf::from)
                .unwrap_or_else(|| dist_dir.to_path_buf()),
            dist_files: read_string_list(store, "distFiles")?
                .unwrap_or_else(|| dist_files.to_vec()),
        };

        if log_defaults {
            for key in &defaulted {
                tracing::info!(
                    "- Missing config: {}, using default: {}",
                    key,
                    config.display_value(key)
                );
            }
        }

        Ok(Resolution { config, defaulted })
    }

    /// Render a key's resolved value for diagnostics
    pub fn display_value(&self, key: &str) -> String {
        match key {
            "filePattern" => format!("`{}`", self.file_pattern),
            "ignorePattern" => match &self.ignore_pattern {
                Some(p) => format!("`{p}`"),
                None => "`null`".to_string(),
            },
            "compression" => format!("`{}`", self.compression),
            "zopfli" => format!("`{}`", self.zopfli),
            "keep" => format!("`{}`", self.keep),
            "distDir" => format!("`{}`", self.dist_dir.display()),
            "distFiles" => format!("`{} files`", self.dist_files.len()),
            _ => String::new(),
        }
    }
}

/// `None` = absent, `Some(None)` = explicit null
fn read_string(store: &dyn ConfigStore, key: &str) -> Result<Option<Option<String>>> {
    match store.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(CompressError::InvalidConfigValue {
            key: key.to_string(),
            expected: "a string",
        }),
    }
}

fn read_bool(store: &dyn ConfigStore, key: &str) -> Result<Option<bool>> {
    match store.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(CompressError::InvalidConfigValue {
            key: key.to_string(),
            expected: "a boolean",
        }),
    }
}

/// Explicit null yields an empty list
fn read_string_list(store: &dyn ConfigStore, key: &str) -> Result<Option<Vec<String>>> {
    let invalid = || CompressError::InvalidConfigValue {
        key: key.to_string(),
        expected: "a list of strings",
    };

    match store.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(Vec::new())),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(_) => Err(invalid()),
    }
}

/// A single token or a list of tokens; non-string tokens are reported as
/// invalid `compression` values
fn read_compression(store: &dyn ConfigStore, keep: bool) -> Result<CompressionSelector> {
    let token = |value: &Value| match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(CompressError::InvalidCompression {
            value: other.to_string(),
        }),
    };

    match store.get("compression") {
        None | Some(Value::Null) => Ok(CompressionSelector::best()),
        Some(Value::Array(items)) => {
            let raw = items.iter().map(token).collect::<Result<Vec<String>>>()?;
            CompressionSelector::parse(raw, keep)
        },
        Some(single) => CompressionSelector::parse([token(single)?], keep),
    }
}
