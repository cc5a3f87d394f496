// Body compression backends.
//
// Provides a pluggable `CompressBackend` trait with built-in implementations:
//   - Zlib/Deflate (via flate2), the default
//   - LZMA (via lzma-rs, feature-gated `lzma`)
//   - NoCompression (passthrough)
//
// The payload header stores a one-byte codec id so the reverse path can pick
// the matching decompressor without guessing:
//   ID 0 = none
//   ID 1 = zlib
//   ID 2 = lzma

use std::io;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Codec ids
// ---------------------------------------------------------------------------

/// Compressor identifier recorded in the payload header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CodecId {
    /// Body stored as-is.
    None = 0,
    /// zlib stream (deflate + zlib header + Adler-32 trailer).
    #[default]
    Zlib = 1,
    /// LZMA "alone" stream.
    Lzma = 2,
}

impl CodecId {
    /// Parse a header byte. Returns `None` for unassigned ids.
    pub fn from_u8(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::Zlib),
            2 => Some(Self::Lzma),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Short lowercase name, as accepted by the CLI.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Lzma => "lzma",
        }
    }
}

impl std::fmt::Display for CodecId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CompressBackend trait
// ---------------------------------------------------------------------------

/// A general-purpose lossless compressor for payload bodies.
///
/// `decompress(compress(x), x.len()) == x` must hold for every `x`. Output
/// does not have to be identical across calls.
///
/// # Implementing a custom backend
///
/// ```no_run
/// use sonopix::compress::backend::{CodecId, CompressBackend};
///
/// struct Identity;
///
/// impl CompressBackend for Identity {
///     fn id(&self) -> CodecId { CodecId::None }
///     fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
///         Ok(data.to_vec())
///     }
///     fn decompress(&self, data: &[u8], limit: usize) -> sonopix::Result<Vec<u8>> {
///         Ok(data[..data.len().min(limit)].to_vec())
///     }
/// }
/// ```
pub trait CompressBackend: Send + Sync {
    /// The codec id written to the payload header.
    fn id(&self) -> CodecId;

    /// Compress a body. Returns compressed bytes.
    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>>;

    /// Decompress a body previously produced by `compress()`, producing at
    /// most `limit` bytes. Output past `limit` is never materialised.
    ///
    /// Malformed or truncated input yields [`Error::Compression`].
    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>>;
}

// ---------------------------------------------------------------------------
// Zlib backend
// ---------------------------------------------------------------------------

/// Default zlib level. The highest level pays off on delta-encoded PCM.
pub const DEFAULT_ZLIB_LEVEL: u32 = 9;

/// Zlib/Deflate compressor (ID 1).
///
/// Uses zlib format (deflate + zlib header), not raw deflate,
/// so the stream is self-describing and includes a checksum.
#[derive(Debug, Clone, Copy)]
pub struct ZlibBackend {
    level: flate2::Compression,
}

impl ZlibBackend {
    /// Create a Zlib backend with the given compression level (0-9).
    pub fn new(level: u32) -> Self {
        Self {
            level: flate2::Compression::new(level.min(9)),
        }
    }
}

impl Default for ZlibBackend {
    fn default() -> Self {
        Self::new(DEFAULT_ZLIB_LEVEL)
    }
}

impl CompressBackend for ZlibBackend {
    fn id(&self) -> CodecId {
        CodecId::Zlib
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        use flate2::write::ZlibEncoder;
        use io::Write;

        let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 64), self.level);
        encoder.write_all(data)?;
        encoder.finish()
    }

    // Drives `Decompress` directly rather than `ZlibDecoder` so a stream that
    // ends before its trailer is reported instead of yielding a short body,
    // and so the output buffer never grows past `limit`.
    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>> {
        use flate2::{Decompress, FlushDecompress, Status};

        let mut inflater = Decompress::new(true);
        let mut output = Vec::with_capacity(data.len().saturating_mul(3).max(64).min(limit));

        loop {
            if output.len() == limit {
                return finish_at_limit(&mut inflater, data, output);
            }
            if output.len() == output.capacity() {
                let grow = output.capacity().max(64).min(limit - output.len());
                output.reserve_exact(grow);
            }

            let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
            let consumed = in_before as usize;
            let status = inflater
                .decompress_vec(&data[consumed..], &mut output, FlushDecompress::Finish)
                .map_err(|e| Error::Compression(format!("zlib decompression failed: {e}")))?;

            match status {
                Status::StreamEnd => return Ok(output),
                Status::Ok | Status::BufError => {
                    let stalled =
                        inflater.total_in() == in_before && inflater.total_out() == out_before;
                    if stalled && output.len() < output.capacity() {
                        return Err(truncated_error(&inflater, data));
                    }
                }
            }
        }
    }
}

/// Continue a zlib stream whose output already holds `limit` bytes.
///
/// The rest of the stream is run through a one-byte scratch buffer so the
/// Adler-32 trailer is still checked when the body is exactly `limit` bytes.
/// The first byte past the limit stops decoding.
fn finish_at_limit(
    inflater: &mut flate2::Decompress,
    data: &[u8],
    output: Vec<u8>,
) -> Result<Vec<u8>> {
    use flate2::{FlushDecompress, Status};

    let mut scratch = [0u8; 1];
    loop {
        let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
        let status = inflater
            .decompress(&data[in_before as usize..], &mut scratch, FlushDecompress::Finish)
            .map_err(|e| Error::Compression(format!("zlib decompression failed: {e}")))?;
        if inflater.total_out() > out_before {
            return Ok(output);
        }
        match status {
            Status::StreamEnd => return Ok(output),
            Status::Ok | Status::BufError => {
                if inflater.total_in() == in_before {
                    return Err(truncated_error(inflater, data));
                }
            }
        }
    }
}

fn truncated_error(inflater: &flate2::Decompress, data: &[u8]) -> Error {
    Error::Compression(format!(
        "zlib stream is truncated after {} of {} bytes",
        inflater.total_in(),
        data.len()
    ))
}

// ---------------------------------------------------------------------------
// LZMA backend
// ---------------------------------------------------------------------------

/// LZMA compressor (ID 2).
#[cfg(feature = "lzma")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LzmaBackend;

#[cfg(feature = "lzma")]
impl CompressBackend for LzmaBackend {
    fn id(&self) -> CodecId {
        CodecId::Lzma
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut input = io::Cursor::new(data);
        let mut output = Vec::new();
        lzma_rs::lzma_compress(&mut input, &mut output)?;
        Ok(output)
    }

    // The decoder is told to stop after `limit` bytes, so neither the output
    // nor the dictionary window can grow past it.
    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>> {
        use lzma_rs::decompress::{Options, UnpackedSize};

        let opts = Options {
            unpacked_size: UnpackedSize::ReadHeaderButUseProvided(Some(limit as u64)),
            ..Default::default()
        };
        let mut input = io::BufReader::new(io::Cursor::new(data));
        let mut output = Vec::new();
        lzma_rs::lzma_decompress_with_options(&mut input, &mut output, &opts)
            .map_err(|e| Error::Compression(format!("LZMA decompression failed: {e}")))?;
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// No-compression backend
// ---------------------------------------------------------------------------

/// Passthrough "compressor" that performs no compression.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompression;

impl CompressBackend for NoCompression {
    fn id(&self) -> CodecId {
        CodecId::None
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>> {
        Ok(data[..data.len().min(limit)].to_vec())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Look up a backend by codec id.
///
/// This is the decode-side dispatch: given the id from the payload header,
/// return the backend that can undo it. `level` only affects compression.
pub fn backend_for_id(id: CodecId, level: u32) -> Result<Box<dyn CompressBackend>> {
    match id {
        CodecId::None => Ok(Box::new(NoCompression)),
        CodecId::Zlib => Ok(Box::new(ZlibBackend::new(level))),

        #[cfg(feature = "lzma")]
        CodecId::Lzma => Ok(Box::new(LzmaBackend)),

        #[cfg(not(feature = "lzma"))]
        CodecId::Lzma => Err(Error::UnsupportedFormat(
            "LZMA compression requires the 'lzma' feature".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
