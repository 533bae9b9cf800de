//! Brotli stream encoder.
//!
//! Always runs at maximum quality: output is produced once per deploy and
//! served many times.

use std::io::{self, Read, Write};

use brotli::enc::BrotliEncoderParams;

use super::{Codec, StreamEncoder};

/// Brotli compression quality (0-11, higher = better compression, slower)
const DEFAULT_QUALITY: i32 = 11;

/// Window size for Brotli (larger = better compression for large files)
const DEFAULT_WINDOW_SIZE: i32 = 22;

/// Brotli encoder
#[derive(Debug, Clone)]
pub struct BrotliEncoder {
    /// Compression quality (0-11)
    pub quality: i32,
    /// Window size (10-24)
    pub window_size: i32,
}

impl Default for BrotliEncoder {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl BrotliEncoder {
    /// Create new Brotli encoder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    fn params(&self) -> BrotliEncoderParams {
        BrotliEncoderParams {
            quality: self.quality,
            lgwin: self.window_size,
            ..Default::default()
        }
    }
}

impl StreamEncoder for BrotliEncoder {
    fn codec(&self) -> Codec {
        Codec::Brotli
    }

    fn name(&self) -> &'static str {
        "brotli"
    }

    fn encode(&self, mut input: &mut dyn Read, mut output: &mut dyn Write) -> io::Result<()> {
        brotli::BrotliCompress(&mut input, &mut output, &self.params())?;
        output.flush()
    }
}
