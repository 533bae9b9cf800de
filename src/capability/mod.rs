//! Browser capability lookup.
//!
//! Brotli is only chosen automatically when every declared browser target
//! can decode it. The project descriptor carries the targets; a
//! [`CapabilityOracle`] answers whether a feature is supported by all of
//! them.
//!
//! Lookups never fail. Missing targets, an empty target list, or a query
//! the oracle cannot interpret all read as "unsupported".

mod table;

use serde::{Deserialize, Serialize};

pub use table::{SupportTable, Version};

/// Feature name used for brotli lookups
pub const BROTLI_FEATURE: &str = "brotli";

/// Answers "is feature F supported by every one of these browser targets".
pub trait CapabilityOracle: Send + Sync {
    /// Check a feature against browser target queries
    fn is_supported(&self, feature: &str, browsers: &[String]) -> bool;
}

/// Declared build targets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    /// Browser target queries, e.g. `"last 2 Chrome versions"` or `"ie 11"`
    #[serde(default)]
    pub browsers: Vec<String>,
}

/// Project descriptor handed over by the deploy host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project name
    #[serde(default)]
    pub name: Option<String>,
    /// Declared targets, if the project has any
    #[serde(default)]
    pub targets: Option<Targets>,
}

impl Project {
    /// Create project with a name and no targets
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            targets: None,
        }
    }

    /// Set browser targets
    pub fn with_browsers<I, S>(mut self, browsers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = Some(Targets {
            browsers: browsers.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Declared browser targets, if any
    pub fn browsers(&self) -> Option<&[String]> {
        self.targets.as_ref().map(|t| t.browsers.as_slice())
    }
}

/// Whether brotli can be used for every declared browser target
pub fn can_use_brotli(project: &Project, oracle: &dyn CapabilityOracle) -> bool {
    match project.browsers() {
        Some(browsers) if !browsers.is_empty() => oracle.is_supported(BROTLI_FEATURE, browsers),
        _ => false,
    }
}
