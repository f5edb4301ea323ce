//! Content-Encoding codec.
//!
//! # Responsibilities
//! - Decode a captured body to raw content by encoding name
//! - Encode raw content back to that same encoding
//!
//! # Design Decisions
//! - Supported names: `""`, `"identity"` (pass-through), `"gzip"`,
//!   `"deflate"` (zlib-wrapped, as HTTP deflate is in practice)
//! - Any other name is an error; callers treat it as "do not rewrite"
//! - Decode failures are surfaced, never papered over; the conservative
//!   fallback of forwarding the original bytes belongs to the caller

use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use thiserror::Error;

/// Errors from decoding or encoding a response body.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Encoding name outside the supported set.
    #[error("unsupported content encoding {0:?}")]
    UnsupportedEncoding(String),

    /// Corrupt or truncated compressed data.
    #[error("codec failure: {0}")]
    Io(#[from] std::io::Error),
}

/// True for encodings this codec can round-trip.
pub fn is_supported(encoding: &str) -> bool {
    matches!(encoding, "" | "identity" | "gzip" | "deflate")
}

/// Decode `buf` to raw content according to `encoding`.
pub fn decode(buf: &[u8], encoding: &str) -> Result<Vec<u8>, CodecError> {
    match encoding {
        "" | "identity" => Ok(buf.to_vec()),
        "gzip" => {
            let mut out = Vec::with_capacity(buf.len() * 2);
            GzDecoder::new(buf).read_to_end(&mut out)?;
            Ok(out)
        }
        "deflate" => {
            let mut out = Vec::with_capacity(buf.len() * 2);
            ZlibDecoder::new(buf).read_to_end(&mut out)?;
            Ok(out)
        }
        other => Err(CodecError::UnsupportedEncoding(other.to_string())),
    }
}

/// Encode raw content back to `encoding`.
pub fn encode(buf: &[u8], encoding: &str) -> Result<Vec<u8>, CodecError> {
    match encoding {
        "" | "identity" => Ok(buf.to_vec()),
        "gzip" => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(buf)?;
            Ok(encoder.finish()?)
        }
        "deflate" => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(buf)?;
            Ok(encoder.finish()?)
        }
        other => Err(CodecError::UnsupportedEncoding(other.to_string())),
    }
}
