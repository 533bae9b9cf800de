//! Error types for the compression step.
//!
//! Errors fall into five groups, each surfaced at a different point of the
//! run:
//!
//! - **Configuration**: bad `compression` tokens, mixed `best`, multiple
//!   codecs without `keep`, mistyped values, bad glob patterns. Raised by
//!   `configure` before any file is touched.
//! - **Missing dependency**: the zopfli encoder was requested but the crate
//!   was built without it. Raised when the gzip pass is prepared.
//! - **Path**: a dist file entry is absolute or uses `..` to leave the dist
//!   directory. Aborts the codec pass before the file is opened.
//! - **I/O**: a source could not be read, a destination written or a rename
//!   performed. Aborts the codec pass it happened in.
//! - **Task**: a blocking worker panicked or was cancelled.
//!
//! Browser capability lookups never fail; an unanswerable lookup reads as
//! "unsupported".

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while configuring or running the compression step.
#[derive(Error, Debug)]
pub enum CompressError {
    /// A `compression` token is not one of `best`, `gzip` or `brotli`.
    #[error("The \"compression\" config option has a wrong value: \"{value}\"")]
    InvalidCompression {
        /// The offending token.
        value: String,
    },

    /// `best` was listed alongside another token.
    #[error("The \"compression\" config cannot combine \"best\" with other values")]
    BestCombined,

    /// More than one codec was requested while `keep` is false.
    #[error(
        "The \"compression\" config can only contain multiple values when \"keep\" is true, \
         otherwise the compressed files would overwrite each other"
    )]
    MultipleCodecsWithoutKeep,

    /// A config key holds a value of the wrong type.
    #[error("The \"{key}\" config option must be {expected}")]
    InvalidConfigValue {
        /// Config key.
        key: String,
        /// Human description of the accepted type.
        expected: &'static str,
    },

    /// A glob pattern failed to compile.
    #[error("Invalid glob pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The pattern as written in the config.
        pattern: String,
        /// Underlying parse error.
        #[source]
        source: globset::Error,
    },

    /// Config file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// An optional encoder was requested but is not available in this build.
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    /// A dist file entry is absolute or climbs out of the dist directory.
    #[error("Dist file `{path}` must be a relative path inside the dist directory")]
    OutsideDistDir {
        /// The entry as listed.
        path: String,
    },

    /// Reading, writing or renaming a file failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A blocking compression task did not complete.
    #[error("Task error: {0}")]
    Task(String),
}

impl CompressError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors raised while validating configuration.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidCompression { .. }
                | Self::BestCombined
                | Self::MultipleCodecsWithoutKeep
                | Self::InvalidConfigValue { .. }
                | Self::InvalidPattern { .. }
                | Self::Config(_)
        )
    }
}

/// Result type alias for compression operations
pub type Result<T> = std::result::Result<T, CompressError>;

impl From<toml::de::Error> for CompressError {
    fn from(err: toml::de::Error) -> Self {
        CompressError::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CompressError {
    fn from(err: tokio::task::JoinError) -> Self {
        CompressError::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_compression_names_token() {
        let err = CompressError::InvalidCompression {
            value: "rar".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"The "compression" config option has a wrong value: "rar""#
        );
        assert!(err.is_config());
    }

    #[test]
    fn test_io_error_carries_path() {
        let err = CompressError::io(
            "dist/app.js",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("dist/app.js"));
        assert!(!err.is_config());
    }

    #[test]
    fn test_outside_dist_dir_names_entry() {
        let err = CompressError::OutsideDistDir {
            path: "../secrets.js".to_string(),
        };
        assert!(err.to_string().contains("`../secrets.js`"));
        assert!(!err.is_config());
    }
}
