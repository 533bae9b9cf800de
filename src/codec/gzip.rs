//! Gzip-family stream encoders.
//!
//! The standard encoder is flate2. When `zopfli` is configured the zopfli
//! encoder is substituted; it writes the same gzip format, denser and much
//! slower. Zopfli is an optional cargo feature and is looked up through
//! [`zopfli_encoder`].

use std::io::{self, Read, Write};
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;

use super::{Codec, StreamEncoder};
use crate::error::{CompressError, Result};

/// Standard gzip encoder backed by flate2
#[derive(Debug, Clone)]
pub struct GzipEncoder {
    /// Deflate level (0-9)
    pub level: u32,
}

impl Default for GzipEncoder {
    fn default() -> Self {
        Self {
            level: Compression::default().level(),
        }
    }
}

impl GzipEncoder {
    /// Create new gzip encoder with the default level
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamEncoder for GzipEncoder {
    fn codec(&self) -> Codec {
        Codec::Gzip
    }

    fn name(&self) -> &'static str {
        "gzip"
    }

    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<()> {
        let mut encoder = GzEncoder::new(output, Compression::new(self.level));
        io::copy(input, &mut encoder)?;
        encoder.finish()?.flush()
    }
}

/// Zopfli encoder producing gzip-framed output
#[cfg(feature = "zopfli")]
#[derive(Default)]
pub struct ZopfliEncoder {
    options: zopfli::Options,
}

#[cfg(feature = "zopfli")]
impl StreamEncoder for ZopfliEncoder {
    fn codec(&self) -> Codec {
        Codec::Gzip
    }

    fn name(&self) -> &'static str {
        "zopfli"
    }

    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<()> {
        zopfli::compress(&self.options, &zopfli::Format::Gzip, input, &mut *output)?;
        output.flush()
    }
}

/// Look up the zopfli encoder, `None` when this build was compiled without it.
#[cfg(feature = "zopfli")]
pub fn zopfli_encoder() -> Option<Arc<dyn StreamEncoder>> {
    Some(Arc::new(ZopfliEncoder::default()))
}

/// Look up the zopfli encoder, `None` when this build was compiled without it.
#[cfg(not(feature = "zopfli"))]
pub fn zopfli_encoder() -> Option<Arc<dyn StreamEncoder>> {
    None
}

/// Pick the encoder for the gzip pass.
///
/// Fails with [`CompressError::MissingDependency`] only when zopfli is
/// requested and unavailable.
pub fn resolve_gzip_encoder(zopfli: bool) -> Result<Arc<dyn StreamEncoder>> {
    if !zopfli {
        tracing::debug!("Using standard gzip for compression");
        return Ok(Arc::new(GzipEncoder::default()));
    }

    match zopfli_encoder() {
        Some(encoder) => {
            tracing::debug!("Using zopfli for compression");
            Ok(encoder)
        },
        None => Err(CompressError::MissingDependency(
            "zopfli was requested but this build does not include it; \
             rebuild with `--features zopfli` or set `zopfli = false`"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_gzip_roundtrip() {
        let encoder = GzipEncoder::new();
        let original = b"alert(\"Hello foo world!\"); alert(\"Hello foo world!\");";

        let mut compressed = Vec::new();
        encoder
            .encode(&mut &original[..], &mut compressed)
            .unwrap();

        // gzip magic bytes
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
        assert_eq!(gunzip(&compressed), original);
    }

    #[test]
    fn test_default_level_matches_zlib() {
        assert_eq!(GzipEncoder::default().level, 6);
    }

    #[test]
    fn test_resolve_standard_gzip() {
        let encoder = resolve_gzip_encoder(false).unwrap();
        assert_eq!(encoder.name(), "gzip");
        assert_eq!(encoder.codec(), Codec::Gzip);
    }

    #[cfg(not(feature = "zopfli"))]
    #[test]
    fn test_resolve_zopfli_without_feature() {
        assert!(zopfli_encoder().is_none());
        let err = resolve_gzip_encoder(true).err().unwrap();
        assert!(matches!(err, CompressError::MissingDependency(_)));
        assert!(err.to_string().contains("zopfli"));
    }

    #[cfg(feature = "zopfli")]
    #[test]
    fn test_zopfli_roundtrip() {
        let encoder = resolve_gzip_encoder(true).unwrap();
        assert_eq!(encoder.name(), "zopfli");

        let original = b"a { b: c } a { b: c } a { b: c }";
        let mut compressed = Vec::new();
        encoder
            .encode(&mut &original[..], &mut compressed)
            .unwrap();
        assert_eq!(gunzip(&compressed), original);
    }
}
