// Conversion engine: ties payload building to pixel packing.
//
// Provides the high-level forward and reverse APIs:
//   - audio bytes -> TaggedPayload -> PixelGrid (-> PNG bytes)
//   - (PNG bytes ->) PixelGrid -> TaggedPayload -> audio bytes
//
// Every call is a self-contained in-memory pipeline with no shared state.

use crate::compress::payload::{self, CompressOptions};
use crate::error::{Error, Result};
use crate::format::AudioFormat;
use crate::raster::grid::{self, ChannelMode, DEFAULT_MAX_WIDTH, PixelGrid};
use crate::raster::header::{HEADER_LEN, PayloadHeader};
use crate::raster::png_io;

/// Default cap on input audio size (100 MiB).
pub const DEFAULT_MAX_INPUT_SIZE: u64 = 100 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Convert options
// ---------------------------------------------------------------------------

/// Configuration for forward conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Bytes per pixel.
    pub mode: ChannelMode,
    /// Body compression, for formats whose policy compresses.
    pub compress: CompressOptions,
    /// Maximum grid width in pixels.
    pub max_width: u32,
    /// Largest accepted input, in bytes.
    pub max_input_size: u64,
    /// Decode the freshly packed grid and compare with the input.
    pub verify: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            mode: ChannelMode::Grayscale,
            compress: CompressOptions::default(),
            max_width: DEFAULT_MAX_WIDTH,
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            verify: true,
        }
    }
}

impl ConvertOptions {
    /// Default options with the given channel mode.
    pub fn with_mode(mode: ChannelMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Forward
// ---------------------------------------------------------------------------

/// Encode audio bytes into a pixel grid with default compression settings.
pub fn encode_audio_to_grid(
    audio: &[u8],
    format: AudioFormat,
    mode: ChannelMode,
) -> Result<PixelGrid> {
    encode_audio_to_grid_with_options(audio, format, &ConvertOptions::with_mode(mode))
}

/// Encode with custom options.
pub fn encode_audio_to_grid_with_options(
    audio: &[u8],
    format: AudioFormat,
    opts: &ConvertOptions,
) -> Result<PixelGrid> {
    let size = audio.len() as u64;
    if size > opts.max_input_size {
        return Err(Error::TooLarge {
            size,
            limit: opts.max_input_size,
        });
    }

    let payload = payload::build(audio, format, &opts.compress)?;
    let grid = grid::pack_with_width(&payload, opts.mode, opts.max_width)?;

    if opts.verify {
        verify_grid(&grid, audio, format)?;
    }

    Ok(grid)
}

/// Encode audio bytes all the way to a PNG file image.
pub fn encode_audio_to_png(
    audio: &[u8],
    format: AudioFormat,
    opts: &ConvertOptions,
) -> Result<Vec<u8>> {
    let grid = encode_audio_to_grid_with_options(audio, format, opts)?;
    png_io::write_png(&grid)
}

fn verify_grid(grid: &PixelGrid, audio: &[u8], format: AudioFormat) -> Result<()> {
    let (decoded, decoded_format) = decode_grid_to_audio(grid)?;
    if decoded_format != format || decoded != audio {
        return Err(Error::PayloadCorrupt(format!(
            "round-trip verification failed ({} of {} bytes recovered as {decoded_format})",
            decoded.len(),
            audio.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reverse
// ---------------------------------------------------------------------------

/// Recover the original audio bytes and their format from a pixel grid.
pub fn decode_grid_to_audio(grid: &PixelGrid) -> Result<(Vec<u8>, AudioFormat)> {
    let payload = grid::unpack(grid)?;
    let audio = payload::extract(&payload)?;
    Ok((audio, payload.format))
}

/// Recover the original audio bytes from a PNG file image.
pub fn decode_png_to_audio(png: &[u8]) -> Result<(Vec<u8>, AudioFormat)> {
    let grid = png_io::read_png(png)?;
    decode_grid_to_audio(&grid)
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Header and geometry of an encoded PNG, without extracting the audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub mode: ChannelMode,
    pub header: PayloadHeader,
}

impl ImageInfo {
    /// Bytes past the payload that only fill the rectangle.
    pub fn padding(&self) -> u64 {
        let total = u64::from(self.width) * u64::from(self.height) * self.mode.channels() as u64;
        total
            .saturating_sub(HEADER_LEN as u64)
            .saturating_sub(self.header.body_length)
    }
}

/// Read the payload header of a PNG produced by this crate.
pub fn inspect_png(png: &[u8]) -> Result<ImageInfo> {
    let grid = png_io::read_png(png)?;
    // `unpack` applies the capacity checks on top of header parsing.
    let payload = grid::unpack(&grid)?;
    Ok(ImageInfo {
        width: grid.width(),
        height: grid.height(),
        mode: grid.mode(),
        header: payload.header(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::backend::CodecId;

    fn wav_like(n: usize) -> Vec<u8> {
        let mut data = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
        data.extend((0..n).map(|i| ((i as f64 * 0.01).sin() * 90.0 + 128.0) as u8));
        data
    }

    #[test]
    fn mp3_roundtrip_both_modes() {
        let audio: Vec<u8> = (0..10_000u32).map(|i| (i * 131 % 256) as u8).collect();
        for mode in [ChannelMode::Grayscale, ChannelMode::Rgb] {
            let grid = encode_audio_to_grid(&audio, AudioFormat::Mp3, mode).unwrap();
            let (out, format) = decode_grid_to_audio(&grid).unwrap();
            assert_eq!(out, audio);
            assert_eq!(format, AudioFormat::Mp3);
        }
    }

    #[test]
    fn wav_roundtrip_both_modes() {
        let audio = wav_like(20_000);
        for mode in [ChannelMode::Grayscale, ChannelMode::Rgb] {
            let grid = encode_audio_to_grid(&audio, AudioFormat::Wav, mode).unwrap();
            let (out, format) = decode_grid_to_audio(&grid).unwrap();
            assert_eq!(out, audio);
            assert_eq!(format, AudioFormat::Wav);
        }
    }

    #[test]
    fn wav_grid_is_smaller_than_raw() {
        let audio = wav_like(50_000);
        let grid = encode_audio_to_grid(&audio, AudioFormat::Wav, ChannelMode::Grayscale).unwrap();
        assert!(grid.as_bytes().len() < audio.len());
    }

    #[test]
    fn empty_input_roundtrip() {
        for format in AudioFormat::ALL {
            for mode in [ChannelMode::Grayscale, ChannelMode::Rgb] {
                let grid = encode_audio_to_grid(&[], format, mode).unwrap();
                assert_eq!(grid.height(), 1);
                let (out, f) = decode_grid_to_audio(&grid).unwrap();
                assert!(out.is_empty());
                assert_eq!(f, format);
            }
        }
    }

    #[test]
    fn png_roundtrip() {
        let audio = wav_like(4_000);
        let opts = ConvertOptions::with_mode(ChannelMode::Rgb);
        let png = encode_audio_to_png(&audio, AudioFormat::Wav, &opts).unwrap();
        let (out, format) = decode_png_to_audio(&png).unwrap();
        assert_eq!(out, audio);
        assert_eq!(format, AudioFormat::Wav);
    }

    #[test]
    fn size_limit_enforced() {
        let opts = ConvertOptions {
            max_input_size: 16,
            ..Default::default()
        };
        let err = encode_audio_to_grid_with_options(&[0u8; 17], AudioFormat::Mp3, &opts);
        assert!(matches!(err, Err(Error::TooLarge { size: 17, limit: 16 })));
    }

    #[test]
    fn narrow_layout() {
        let audio = vec![7u8; 500];
        let opts = ConvertOptions {
            max_width: 16,
            ..Default::default()
        };
        let grid = encode_audio_to_grid_with_options(&audio, AudioFormat::Mp3, &opts).unwrap();
        assert_eq!(grid.width(), 16);
        assert_eq!(grid.height(), (528usize).div_ceil(16) as u32);
        assert_eq!(decode_grid_to_audio(&grid).unwrap().0, audio);
    }

    #[test]
    fn padding_never_underflows() {
        let grid = encode_audio_to_grid(b"abc", AudioFormat::Mp3, ChannelMode::Grayscale).unwrap();
        let mut info = ImageInfo {
            width: grid.width(),
            height: grid.height(),
            mode: grid.mode(),
            header: grid::unpack(&grid).unwrap().header(),
        };
        assert_eq!(info.padding(), 0);

        info.header.body_length = u64::MAX;
        assert_eq!(info.padding(), 0);
        info.width = 1;
        info.height = 1;
        info.header.body_length = 0;
        assert_eq!(info.padding(), 0);
    }

    #[test]
    fn inspect_reports_header() {
        let audio = wav_like(1_000);
        let opts = ConvertOptions {
            compress: CompressOptions {
                codec: CodecId::Zlib,
                level: 1,
            },
            ..Default::default()
        };
        let png = encode_audio_to_png(&audio, AudioFormat::Wav, &opts).unwrap();
        let info = inspect_png(&png).unwrap();
        assert_eq!(info.mode, ChannelMode::Grayscale);
        assert_eq!(info.header.format, AudioFormat::Wav);
        assert_eq!(info.header.codec, CodecId::Zlib);
        assert_eq!(info.header.original_length, audio.len() as u64);
        assert!(info.padding() < u64::from(info.width));
    }
}
