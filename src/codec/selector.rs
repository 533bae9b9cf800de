//! `compression` selector tokens and the per-run codec plan.
//!
//! The selector is an ordered list drawn from `best`, `gzip` and `brotli`.
//! Validation rejects unknown tokens, `best` mixed with anything else, and
//! more than one token while `keep` is off (two codecs replacing the same
//! original would leave only the last one's output).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Codec;
use crate::error::{CompressError, Result};

/// A single `compression` selector token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionToken {
    /// Brotli when every browser target supports it, gzip otherwise
    Best,
    /// Always gzip
    Gzip,
    /// Always brotli
    Brotli,
}

impl CompressionToken {
    /// Token as written in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionToken::Best => "best",
            CompressionToken::Gzip => "gzip",
            CompressionToken::Brotli => "brotli",
        }
    }
}

impl FromStr for CompressionToken {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "best" => Ok(CompressionToken::Best),
            "gzip" => Ok(CompressionToken::Gzip),
            "brotli" => Ok(CompressionToken::Brotli),
            other => Err(CompressError::InvalidCompression {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for CompressionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, ordered list of selector tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionSelector {
    tokens: Vec<CompressionToken>,
}

impl Default for CompressionSelector {
    fn default() -> Self {
        Self::best()
    }
}

impl CompressionSelector {
    /// The default selector, `[best]`
    pub fn best() -> Self {
        Self {
            tokens: vec![CompressionToken::Best],
        }
    }

    /// Parse and validate raw tokens against the `keep` flag.
    ///
    /// Every token is checked before the combination rules run, so an
    /// unknown token is always the reported error when one is present.
    pub fn parse<I, S>(raw: I, keep: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = raw
            .into_iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<CompressionToken>>>()?;

        Self::from_tokens(tokens, keep)
    }

    /// Validate already-typed tokens against the `keep` flag
    pub fn from_tokens(tokens: Vec<CompressionToken>, keep: bool) -> Result<Self> {
        if tokens.contains(&CompressionToken::Best) && tokens.len() > 1 {
            return Err(CompressError::BestCombined);
        }
        if tokens.len() > 1 && !keep {
            return Err(CompressError::MultipleCodecsWithoutKeep);
        }
        Ok(Self { tokens })
    }

    /// Tokens in configured order
    pub fn tokens(&self) -> &[CompressionToken] {
        &self.tokens
    }

    /// Check if a token was configured
    pub fn contains(&self, token: CompressionToken) -> bool {
        self.tokens.contains(&token)
    }
}

impl std::fmt::Display for CompressionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<&str> = self.tokens.iter().map(|t| t.as_str()).collect();
        write!(f, "[{}]", joined.join(", "))
    }
}

/// Which codec passes a run has to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecPlan {
    /// Run the gzip pass
    pub must_gzip: bool,
    /// Run the brotli pass
    pub must_brotli: bool,
}

impl CodecPlan {
    /// Decide the passes from the selector and brotli capability.
    ///
    /// With `[best]` exactly one flag is set. Explicit `gzip` and `brotli`
    /// tokens set their flag regardless of capability.
    pub fn select(selector: &CompressionSelector, can_use_brotli: bool) -> Self {
        let best = selector.contains(CompressionToken::Best);
        Self {
            must_gzip: selector.contains(CompressionToken::Gzip) || (best && !can_use_brotli),
            must_brotli: selector.contains(CompressionToken::Brotli) || (best && can_use_brotli),
        }
    }

    /// Whether a codec pass is required
    pub fn requires(&self, codec: Codec) -> bool {
        match codec {
            Codec::Gzip => self.must_gzip,
            Codec::Brotli => self.must_brotli,
        }
    }

    /// Required codecs in reporting order
    pub fn codecs(&self) -> Vec<Codec> {
        Codec::all()
            .iter()
            .copied()
            .filter(|c| self.requires(*c))
            .collect()
    }
}
