// Audio container identification.
//
// `AudioFormat` is the tag stored in the payload header. Each format carries
// a fixed `FormatPolicy` that decides which reversible transforms run before
// packing; adding a format means adding a tag and a table row.
//
// Sniffing is deliberately shallow: it checks the RIFF/WAVE/fmt layout for
// WAV and looks for an MPEG frame sync (after an optional ID3v2 tag) for MP3.

use std::path::Path;

use crate::error::{Error, Result};

/// Number of leading bytes inspected when looking for an MPEG frame sync.
const MP3_SYNC_SCAN: usize = 100;

/// Minimum size of a canonical WAV header.
const WAV_MIN_HEADER: usize = 44;

/// WAVE `fmt ` audio format codes accepted by the sniffer.
const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_MULAW: u16 = 0x0007;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

// ---------------------------------------------------------------------------
// AudioFormat + policy table
// ---------------------------------------------------------------------------

/// Source audio container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AudioFormat {
    Mp3 = 1,
    Wav = 2,
}

/// Which transforms a format goes through before packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPolicy {
    /// Apply the byte-wise delta transform.
    pub delta: bool,
    /// Compress the (possibly delta-encoded) body.
    pub compress: bool,
}

/// Per-format transform policy, indexed by `tag() - 1`.
///
/// MP3 frames are already entropy coded, so both transforms are skipped.
const POLICY_TABLE: [FormatPolicy; AudioFormat::ALL.len()] = [
    // MP3
    FormatPolicy {
        delta: false,
        compress: false,
    },
    // WAV
    FormatPolicy {
        delta: true,
        compress: true,
    },
];

impl AudioFormat {
    /// All supported formats, in tag order.
    pub const ALL: [AudioFormat; 2] = [AudioFormat::Mp3, AudioFormat::Wav];

    /// Parse a header tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    /// The tag byte written to the payload header.
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn policy(self) -> FormatPolicy {
        POLICY_TABLE[usize::from(self.tag() - 1)]
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// Map a file extension (with or without leading dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
    }

    /// Map a path by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether `data` looks like a well-formed file of this format.
    pub fn validate(self, data: &[u8]) -> bool {
        match self {
            Self::Mp3 => looks_like_mp3(data),
            Self::Wav => looks_like_wav(data),
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mp3 => f.write_str("MP3"),
            Self::Wav => f.write_str("WAV"),
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Identify the container from content alone. WAV is checked first since its
/// header is unambiguous.
pub fn sniff(data: &[u8]) -> Option<AudioFormat> {
    if looks_like_wav(data) {
        Some(AudioFormat::Wav)
    } else if looks_like_mp3(data) {
        Some(AudioFormat::Mp3)
    } else {
        None
    }
}

/// Resolve the format of `data` read from `path`.
///
/// The extension selects the candidate and the content must agree with it.
/// With `force`, a recognised extension is trusted without inspecting the
/// content. Without a recognised extension, content sniffing decides.
pub fn detect(path: &Path, data: &[u8], force: bool) -> Result<AudioFormat> {
    match AudioFormat::from_path(path) {
        Some(format) if force || format.validate(data) => Ok(format),
        Some(format) => Err(Error::UnsupportedFormat(format!(
            "{} does not have a valid {format} structure",
            path.display()
        ))),
        None => sniff(data).ok_or_else(|| {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            Error::UnsupportedFormat(format!(
                "unsupported file type '.{ext}', only .mp3 and .wav are supported"
            ))
        }),
    }
}

fn looks_like_wav(data: &[u8]) -> bool {
    if data.len() < WAV_MIN_HEADER {
        return false;
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" || &data[12..16] != b"fmt " {
        return false;
    }
    let audio_format = u16::from_le_bytes([data[20], data[21]]);
    matches!(
        audio_format,
        WAVE_FORMAT_PCM | WAVE_FORMAT_MULAW | WAVE_FORMAT_EXTENSIBLE
    )
}

fn looks_like_mp3(data: &[u8]) -> bool {
    if data.len() < 4 {
        return false;
    }

    let mut frames = data;
    if data.starts_with(b"ID3") {
        if data.len() < 10 {
            return false;
        }
        // ID3v2 size is synch-safe: 7 bits per byte.
        let size = (data[6..10])
            .iter()
            .fold(0usize, |acc, &b| (acc << 7) | (b & 0x7F) as usize);
        let tag_end = 10 + size;
        if data.len() >= tag_end + 4 {
            frames = &data[tag_end..];
        }
    }

    let scan = frames.len().saturating_sub(3).min(MP3_SYNC_SCAN);
    (0..scan).any(|i| is_frame_sync(frames[i], frames[i + 1]))
}

/// MPEG audio frame sync: 11 set bits, version not reserved, layer not
/// reserved.
fn is_frame_sync(b0: u8, b1: u8) -> bool {
    if b0 != 0xFF || b1 & 0xE0 != 0xE0 {
        return false;
    }
    let version = (b1 >> 3) & 0x03;
    let layer = (b1 >> 1) & 0x03;
    version != 0x01 && layer != 0x00
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
