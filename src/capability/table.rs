//! Built-in capability oracle backed by a static support table.
//!
//! Understands the browser queries projects usually declare:
//!
//! | Query                          | Supported when                     |
//! |--------------------------------|------------------------------------|
//! | `chrome 61`                    | version >= first supporting release |
//! | `safari >= 11` / `safari > 11` | bound >= first supporting release   |
//! | `last 2 firefox versions`      | browser ever shipped the feature    |
//! | `firefox esr`                  | browser ever shipped the feature    |
//! | `not ...`                      | ignored (only removes targets)      |
//!
//! Anything else (usage-share queries, `defaults`, unknown browsers) cannot
//! be proven to support the feature and reads as unsupported.

use std::collections::HashMap;
use std::str::FromStr;

use super::{CapabilityOracle, BROTLI_FEATURE};

/// Browser version as `major.minor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub u32, pub u32);

impl FromStr for Version {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // Ranges like "11.0-11.2" are judged by their lower end.
        let s = s.split('-').next().unwrap_or(s);
        let mut parts = s.split('.');
        let major = parts.next().ok_or(())?.parse().map_err(|_| ())?;
        let minor = match parts.next() {
            Some(m) => m.parse().map_err(|_| ())?,
            None => 0,
        };
        Ok(Version(major, minor))
    }
}

/// Static feature support table
#[derive(Debug, Clone)]
pub struct SupportTable {
    /// feature -> browser -> first version with support
    features: HashMap<String, HashMap<String, Version>>,
}

impl Default for SupportTable {
    fn default() -> Self {
        let brotli = [
            ("chrome", Version(50, 0)),
            ("edge", Version(15, 0)),
            ("firefox", Version(44, 0)),
            ("safari", Version(11, 0)),
            ("opera", Version(38, 0)),
            ("ios_saf", Version(11, 0)),
            ("and_chr", Version(50, 0)),
            ("and_ff", Version(44, 0)),
            ("samsung", Version(5, 0)),
        ];

        let mut table = Self::empty();
        for (browser, version) in brotli {
            table.insert(BROTLI_FEATURE, browser, version);
        }
        table
    }
}

impl SupportTable {
    /// Table with no entries; every lookup is unsupported
    pub fn empty() -> Self {
        Self {
            features: HashMap::new(),
        }
    }

    /// Record the first version of `browser` supporting `feature`
    pub fn insert(&mut self, feature: &str, browser: &str, since: Version) {
        self.features
            .entry(feature.to_string())
            .or_default()
            .insert(canonical_browser(browser).to_string(), since);
    }

    /// First supporting version, if the browser ever shipped the feature
    pub fn since(&self, feature: &str, browser: &str) -> Option<Version> {
        self.features
            .get(feature)?
            .get(canonical_browser(browser))
            .copied()
    }

    /// Evaluate one browser query for a feature
    pub fn query_supported(&self, feature: &str, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        let words: Vec<&str> = query.split_whitespace().collect();

        match words.as_slice() {
            ["not", ..] => true,
            ["last", count, browser, "version" | "versions"] if count.parse::<u32>().is_ok() => {
                self.since(feature, browser).is_some()
            },
            ["firefox" | "ff", "esr"] => self.since(feature, "firefox").is_some(),
            [browser, ">=" | ">", version] | [browser, version] => {
                match (self.since(feature, browser), version.parse::<Version>()) {
                    (Some(since), Ok(version)) => version >= since,
                    _ => false,
                }
            },
            _ => false,
        }
    }
}

impl CapabilityOracle for SupportTable {
    fn is_supported(&self, feature: &str, browsers: &[String]) -> bool {
        browsers.iter().any(|query| !is_negation(query))
            && browsers.iter().all(|query| {
                let supported = self.query_supported(feature, query);
                if !supported {
                    tracing::debug!("`{}` not supported by browser target `{}`", feature, query);
                }
                supported
            })
    }
}

fn is_negation(query: &str) -> bool {
    query.trim_start().to_lowercase().starts_with("not ")
}

/// Map browser aliases to the table's names
fn canonical_browser(name: &str) -> &str {
    match name {
        "chromeandroid" | "and_chr" => "and_chr",
        "firefoxandroid" | "and_ff" => "and_ff",
        "ios" | "ios_saf" => "ios_saf",
        "ff" | "firefox" => "firefox",
        "explorer" | "ie" => "ie",
        "operamini" | "op_mini" => "op_mini",
        other => other,
    }
}
