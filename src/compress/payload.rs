// Tagged payload construction and extraction.
//
// Forward: audio bytes -> [delta] -> [compress] -> body, guided by the
// format's policy row. Reverse: body -> [decompress] -> [delta decode] ->
// trim to `original_length` -> CRC-32 check. The flags recorded on the
// payload, not the policy table, drive the reverse path.

use crate::compress::backend::{self, CodecId, DEFAULT_ZLIB_LEVEL};
use crate::compress::delta;
use crate::error::{Error, Result};
use crate::format::AudioFormat;
use crate::raster::header::{PayloadFlags, PayloadHeader};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Body compression settings, used only when the format policy asks for
/// compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Compressor to use. `CodecId::None` disables compression entirely.
    pub codec: CodecId,
    /// Compression level (0-9). Ignored by backends without levels.
    pub level: u32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            codec: CodecId::Zlib,
            level: DEFAULT_ZLIB_LEVEL,
        }
    }
}

// ---------------------------------------------------------------------------
// TaggedPayload
// ---------------------------------------------------------------------------

/// Header fields plus the transformed body: the unit that gets packed into
/// pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedPayload {
    pub format: AudioFormat,
    pub compressed: bool,
    pub delta_encoded: bool,
    pub codec: CodecId,
    /// Exact byte length of the original audio. Authoritative for trimming.
    pub original_length: u64,
    /// CRC-32 of the original audio.
    pub checksum: u32,
    pub body: Vec<u8>,
}

impl TaggedPayload {
    pub fn flags(&self) -> PayloadFlags {
        let mut flags = PayloadFlags::empty();
        flags.set(PayloadFlags::DELTA, self.delta_encoded);
        flags.set(PayloadFlags::COMPRESSED, self.compressed);
        flags
    }

    pub fn header(&self) -> PayloadHeader {
        PayloadHeader {
            format: self.format,
            flags: self.flags(),
            codec: self.codec,
            original_length: self.original_length,
            body_length: self.body.len() as u64,
            checksum: self.checksum,
        }
    }

    /// Reassemble a payload from a parsed header and its body slice.
    pub fn from_header(header: &PayloadHeader, body: Vec<u8>) -> Self {
        Self {
            format: header.format,
            compressed: header.flags.contains(PayloadFlags::COMPRESSED),
            delta_encoded: header.flags.contains(PayloadFlags::DELTA),
            codec: header.codec,
            original_length: header.original_length,
            checksum: header.checksum,
            body,
        }
    }
}

/// CRC-32 (IEEE) as computed by zlib.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = flate2::Crc::new();
    crc.update(data);
    crc.sum()
}

// ---------------------------------------------------------------------------
// Build / extract
// ---------------------------------------------------------------------------

/// Build a tagged payload from raw audio bytes.
pub fn build(audio: &[u8], format: AudioFormat, opts: &CompressOptions) -> Result<TaggedPayload> {
    let policy = format.policy();
    let compressed = policy.compress && opts.codec != CodecId::None;

    let mut body = audio.to_vec();
    if policy.delta {
        delta::encode_delta_in_place(&mut body);
    }
    let codec = if compressed {
        let backend = backend::backend_for_id(opts.codec, opts.level)?;
        body = backend.compress(&body)?;
        opts.codec
    } else {
        CodecId::None
    };

    Ok(TaggedPayload {
        format,
        compressed,
        delta_encoded: policy.delta,
        codec,
        original_length: audio.len() as u64,
        checksum: crc32(audio),
        body,
    })
}

/// Recover the original audio bytes from a payload.
///
/// Undoes exactly the transforms recorded in the flags, decompression first.
pub fn extract(payload: &TaggedPayload) -> Result<Vec<u8>> {
    let expected = usize::try_from(payload.original_length).map_err(|_| {
        Error::PayloadCorrupt(format!(
            "original length {} does not fit in memory",
            payload.original_length
        ))
    })?;

    // Delta decoding preserves length, so the decompressor never needs to
    // produce more than the audio's own length.
    let mut audio = if payload.compressed {
        let backend = backend::backend_for_id(payload.codec, DEFAULT_ZLIB_LEVEL)?;
        backend.decompress(&payload.body, expected).map_err(|e| match e {
            Error::Compression(msg) => Error::PayloadCorrupt(msg),
            other => other,
        })?
    } else {
        payload.body.clone()
    };

    if payload.delta_encoded {
        delta::decode_delta_in_place(&mut audio);
    }

    if audio.len() < expected {
        return Err(Error::PayloadCorrupt(format!(
            "decoded {} bytes, header promises {expected}",
            audio.len()
        )));
    }
    audio.truncate(expected);

    let actual = crc32(&audio);
    if actual != payload.checksum {
        return Err(Error::PayloadCorrupt(format!(
            "checksum mismatch: expected {:#010X}, got {actual:#010X}",
            payload.checksum
        )));
    }

    Ok(audio)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
