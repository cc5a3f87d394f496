// PNG container adapter.
//
// Writes 8-bit grayscale or RGB images and reads them back as raw samples.
// No gamma, ICC, or sRGB chunks are emitted and no decode transformations
// are requested, so every sample survives the round trip unchanged.

use crate::error::{Error, Result};
use crate::raster::grid::{ChannelMode, PixelGrid};

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Whether `data` starts with the PNG signature.
pub fn has_png_signature(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

/// Encode a grid as a PNG file.
///
/// Uses the strongest deflate setting with per-row adaptive filtering.
pub fn write_png(grid: &PixelGrid) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(grid.as_bytes().len() / 2 + 128);
    {
        let mut encoder = png::Encoder::new(&mut out, grid.width(), grid.height());
        encoder.set_color(match grid.mode() {
            ChannelMode::Grayscale => png::ColorType::Grayscale,
            ChannelMode::Rgb => png::ColorType::Rgb,
        });
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Best);
        encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(grid.as_bytes())?;
        writer.finish()?;
    }
    Ok(out)
}

/// Decode a PNG file into a grid with the image's own dimensions.
///
/// Only 8-bit grayscale and RGB images are accepted; anything that would need
/// a sample conversion (palette, alpha, 16-bit) is rejected.
pub fn read_png(data: &[u8]) -> Result<PixelGrid> {
    if !has_png_signature(data) {
        return Err(Error::Image("missing PNG signature".into()));
    }

    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    buf.truncate(frame.buffer_size());

    if frame.bit_depth != png::BitDepth::Eight {
        return Err(Error::UnsupportedFormat(format!(
            "PNG bit depth {:?}, expected 8",
            frame.bit_depth
        )));
    }
    let channels = match frame.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::Rgb => 3,
        other => {
            return Err(Error::UnsupportedFormat(format!(
                "PNG color type {other:?}, expected grayscale or RGB"
            )));
        }
    };

    // Rows are tightly packed for 8-bit samples, so the frame buffer is
    // exactly width * height * channels bytes.
    PixelGrid::from_raw(frame.width, frame.height, channels, buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
