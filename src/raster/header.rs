// Fixed-width payload header stored at byte offset 0 of the pixel buffer.
//
// Layout (little-endian, 28 bytes):
//
//   0   magic            4   b"SNPX"
//   4   version          1
//   5   format tag       1   (1 = MP3, 2 = WAV)
//   6   flags            1   (bit 0 = delta, bit 1 = compressed)
//   7   codec id         1   (0 = none, 1 = zlib, 2 = lzma)
//   8   original length  8
//   16  body length      8
//   24  CRC-32           4   (of the original audio)
//
// The header does not depend on the channel mode: it is always the first
// 28 bytes of the row-major flat buffer.

use bitflags::bitflags;

use crate::compress::backend::CodecId;
use crate::error::{Error, Result};
use crate::format::AudioFormat;

pub const MAGIC: [u8; 4] = *b"SNPX";
pub const VERSION: u8 = 1;
pub const HEADER_LEN: usize = 28;

bitflags! {
    /// Transform indicator bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PayloadFlags: u8 {
        const DELTA = 1 << 0;
        const COMPRESSED = 1 << 1;
    }
}

/// Parsed payload header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadHeader {
    pub format: AudioFormat,
    pub flags: PayloadFlags,
    pub codec: CodecId,
    pub original_length: u64,
    pub body_length: u64,
    pub checksum: u32,
}

impl PayloadHeader {
    /// Serialize to the fixed 28-byte form.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&MAGIC);
        out[4] = VERSION;
        out[5] = self.format.tag();
        out[6] = self.flags.bits();
        out[7] = self.codec.as_u8();
        out[8..16].copy_from_slice(&self.original_length.to_le_bytes());
        out[16..24].copy_from_slice(&self.body_length.to_le_bytes());
        out[24..28].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }

    /// Parse and validate a header from the start of `buf`.
    ///
    /// Only checks that are local to the header happen here; capacity checks
    /// against the grid live in the unpacker.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::HeaderCorrupt(format!(
                "buffer holds {} bytes, header needs {HEADER_LEN}",
                buf.len()
            )));
        }
        if buf[0..4] != MAGIC {
            return Err(Error::HeaderCorrupt(format!(
                "invalid magic: expected {:02X?}, got {:02X?}",
                MAGIC,
                &buf[0..4]
            )));
        }
        if buf[4] != VERSION {
            return Err(Error::HeaderCorrupt(format!(
                "unsupported header version: {}",
                buf[4]
            )));
        }

        let format = AudioFormat::from_tag(buf[5])
            .ok_or_else(|| Error::HeaderCorrupt(format!("unknown format tag: {}", buf[5])))?;

        let flags = PayloadFlags::from_bits(buf[6])
            .ok_or_else(|| Error::HeaderCorrupt(format!("invalid flag bits: {:#04X}", buf[6])))?;

        let codec = CodecId::from_u8(buf[7])
            .ok_or_else(|| Error::HeaderCorrupt(format!("unknown codec id: {}", buf[7])))?;

        let compressed = flags.contains(PayloadFlags::COMPRESSED);
        if compressed == (codec == CodecId::None) {
            return Err(Error::HeaderCorrupt(format!(
                "codec id {codec} inconsistent with compressed flag ({compressed})"
            )));
        }

        let original_length = read_u64(&buf[8..16]);
        let body_length = read_u64(&buf[16..24]);
        let checksum = u32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]);

        // Without compression the body is exactly as long as the audio.
        if !compressed && original_length != body_length {
            return Err(Error::HeaderCorrupt(format!(
                "uncompressed body length {body_length} differs from original length {original_length}"
            )));
        }

        Ok(Self {
            format,
            flags,
            codec,
            original_length,
            body_length,
            checksum,
        })
    }
}

fn read_u64(b: &[u8]) -> u64 {
    let mut arr = [0u8; 8];
    arr.copy_from_slice(b);
    u64::from_le_bytes(arr)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PayloadHeader {
        PayloadHeader {
            format: AudioFormat::Wav,
            flags: PayloadFlags::DELTA | PayloadFlags::COMPRESSED,
            codec: CodecId::Zlib,
            original_length: 123_456,
            body_length: 7_890,
            checksum: 0xDEAD_BEEF,
        }
    }

    #[test]
    fn encode_layout() {
        let bytes = sample().encode();
        assert_eq!(&bytes[0..4], b"SNPX");
        assert_eq!(bytes[4], VERSION);
        assert_eq!(bytes[5], 2);
        assert_eq!(bytes[6], 0b11);
        assert_eq!(bytes[7], 1);
        assert_eq!(&bytes[8..16], &123_456u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &7_890u64.to_le_bytes());
        assert_eq!(&bytes[24..28], &0xDEAD_BEEFu32.to_le_bytes());
    }

    #[test]
    fn decode_encoded() {
        let h = sample();
        assert_eq!(PayloadHeader::decode(&h.encode()).unwrap(), h);
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let h = sample();
        let mut buf = h.encode().to_vec();
        buf.extend_from_slice(&[0xAA; 16]);
        assert_eq!(PayloadHeader::decode(&buf).unwrap(), h);
    }

    #[test]
    fn short_buffer_rejected() {
        let bytes = sample().encode();
        assert!(matches!(
            PayloadHeader::decode(&bytes[..HEADER_LEN - 1]),
            Err(Error::HeaderCorrupt(_))
        ));
    }

    #[test]
    fn bad_magic_rejected() {
        let mut bytes = sample().encode();
        bytes[0] = b'X';
        assert!(matches!(
            PayloadHeader::decode(&bytes),
            Err(Error::HeaderCorrupt(_))
        ));
    }

    #[test]
    fn unknown_format_tag_rejected() {
        let mut bytes = sample().encode();
        bytes[5] = 0x7F;
        let err = PayloadHeader::decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::HeaderCorrupt(ref m) if m.contains("format tag")));
    }

    #[test]
    fn unknown_flag_bits_rejected() {
        let mut bytes = sample().encode();
        bytes[6] |= 0x80;
        assert!(matches!(
            PayloadHeader::decode(&bytes),
            Err(Error::HeaderCorrupt(_))
        ));
    }

    #[test]
    fn codec_flag_mismatch_rejected() {
        let mut bytes = sample().encode();
        bytes[7] = CodecId::None.as_u8();
        assert!(matches!(
            PayloadHeader::decode(&bytes),
            Err(Error::HeaderCorrupt(_))
        ));
    }

    #[test]
    fn uncompressed_length_mismatch_rejected() {
        let h = PayloadHeader {
            format: AudioFormat::Mp3,
            flags: PayloadFlags::empty(),
            codec: CodecId::None,
            original_length: 10,
            body_length: 9,
            checksum: 0,
        };
        assert!(matches!(
            PayloadHeader::decode(&h.encode()),
            Err(Error::HeaderCorrupt(_))
        ));
    }
}
