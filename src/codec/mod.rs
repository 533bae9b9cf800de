//! Codec selection and stream encoders.
//!
//! The step never implements compression itself. Every codec is wrapped in a
//! [`StreamEncoder`], an opaque read-to-write transform, and the rest of the
//! crate only decides *which* encoder runs.
//!
//! # Codecs
//!
//! | Codec        | Suffix | Encoder                            |
//! |--------------|--------|------------------------------------|
//! | [`Gzip`]     | `.gz`  | flate2, or zopfli when configured  |
//! | [`Brotli`]   | `.br`  | brotli, quality 11                 |
//!
//! # Selection
//!
//! ```rust
//! use deploy_compress::codec::{CodecPlan, CompressionSelector};
//!
//! let selector = CompressionSelector::parse(["best"], false).unwrap();
//! let plan = CodecPlan::select(&selector, true);
//! assert!(plan.must_brotli && !plan.must_gzip);
//! ```
//!
//! [`Gzip`]: Codec::Gzip
//! [`Brotli`]: Codec::Brotli

mod algorithm;
mod brotli;
mod gzip;
mod selector;

use std::io::{self, Read, Write};
use std::sync::Arc;

pub use algorithm::Codec;
pub use brotli::BrotliEncoder;
#[cfg(feature = "zopfli")]
pub use gzip::ZopfliEncoder;
pub use gzip::{resolve_gzip_encoder, zopfli_encoder, GzipEncoder};
pub use selector::{CodecPlan, CompressionSelector, CompressionToken};

/// A byte-stream compressor.
///
/// Implementations consume `input` to EOF and write a complete, finished
/// stream to `output`. Byte order is preserved; nothing is buffered across
/// calls.
pub trait StreamEncoder: Send + Sync {
    /// Codec family the output belongs to
    fn codec(&self) -> Codec;

    /// Encoder name for logs
    fn name(&self) -> &'static str;

    /// Stream `input` through the encoder into `output`
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<()>;
}

/// Encoders for the passes of one run
#[derive(Clone)]
pub struct EncoderSet {
    /// Encoder for the gzip pass, if required
    pub gzip: Option<Arc<dyn StreamEncoder>>,
    /// Encoder for the brotli pass, if required
    pub brotli: Option<Arc<dyn StreamEncoder>>,
}

impl EncoderSet {
    /// Build encoders for a plan.
    ///
    /// The gzip encoder is resolved only when the gzip pass is required, so a
    /// missing zopfli build is an error only for runs that would use it.
    pub fn for_plan(plan: CodecPlan, zopfli: bool) -> crate::Result<Self> {
        let gzip = if plan.must_gzip {
            Some(resolve_gzip_encoder(zopfli)?)
        } else {
            None
        };
        let brotli = if plan.must_brotli {
            tracing::debug!("Using brotli for compression");
            Some(Arc::new(BrotliEncoder::new()) as Arc<dyn StreamEncoder>)
        } else {
            None
        };
        Ok(Self { gzip, brotli })
    }
}

impl std::fmt::Debug for EncoderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderSet")
            .field("gzip", &self.gzip.as_ref().map(|e| e.name()))
            .field("brotli", &self.brotli.as_ref().map(|e| e.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_set_follows_plan() {
        let plan = CodecPlan {
            must_gzip: false,
            must_brotli: true,
        };
        let set = EncoderSet::for_plan(plan, false).unwrap();
        assert!(set.gzip.is_none());
        assert_eq!(set.brotli.as_ref().map(|e| e.name()), Some("brotli"));
    }

    #[test]
    fn test_zopfli_not_resolved_without_gzip_pass() {
        let plan = CodecPlan {
            must_gzip: false,
            must_brotli: true,
        };
        // Would fail in a build without zopfli if the gzip encoder were resolved.
        assert!(EncoderSet::for_plan(plan, true).is_ok());
    }
}
