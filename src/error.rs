// Error type shared by every conversion stage.
//
// Variants map one-to-one onto the failure classes of the pipeline:
// compressed-stream damage, a violated length/checksum contract, a bad
// in-band header, and inputs the codec does not handle at all.

use std::io;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the audio <-> raster codec.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The compressed body is malformed, truncated, or fails its own checksum.
    #[error("compression error: {0}")]
    Compression(String),

    /// The recovered audio does not satisfy the length or checksum recorded
    /// in the header.
    #[error("corrupt payload: {0}")]
    PayloadCorrupt(String),

    /// The in-band header is missing, or one of its fields is out of range.
    #[error("corrupt header: {0}")]
    HeaderCorrupt(String),

    /// Input audio container or image layout the codec does not handle.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The PNG container could not be encoded or decoded.
    #[error("image error: {0}")]
    Image(String),

    /// Input exceeds the configured size limit.
    #[error("input is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    /// Input file has no content.
    #[error("input is empty")]
    EmptyInput,

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<png::EncodingError> for Error {
    fn from(e: png::EncodingError) -> Self {
        Self::Image(e.to_string())
    }
}

impl From<png::DecodingError> for Error {
    fn from(e: png::DecodingError) -> Self {
        Self::Image(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = Error::HeaderCorrupt("unknown format tag 9".into());
        assert_eq!(e.to_string(), "corrupt header: unknown format tag 9");

        let e = Error::TooLarge {
            size: 200,
            limit: 100,
        };
        assert_eq!(
            e.to_string(),
            "input is too large (200 bytes, limit 100 bytes)"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = io::Error::new(io::ErrorKind::NotFound, "missing");
        let e: Error = io.into();
        assert!(matches!(e, Error::Io(_)));
    }
}
