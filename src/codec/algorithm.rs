//! Codec identities and their on-disk suffixes.

use serde::{Deserialize, Serialize};

/// Codecs the compression step can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Gzip-framed deflate (standard encoder or zopfli)
    Gzip,
    /// Brotli at maximum quality
    Brotli,
}

impl Codec {
    /// Suffix appended to the compressed sibling of a file
    pub fn suffix(&self) -> &'static str {
        match self {
            Codec::Gzip => ".gz",
            Codec::Brotli => ".br",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Gzip => "gzip",
            Codec::Brotli => "brotli",
        }
    }

    /// All codecs, in the order their passes are reported
    pub fn all() -> &'static [Codec] {
        &[Codec::Gzip, Codec::Brotli]
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
