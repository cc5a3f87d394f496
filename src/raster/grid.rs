// Pixel packing and unpacking.
//
// The header and body are laid out back to back in a flat buffer, which is
// zero-padded up to `width * height * channels` and read as row-major pixels.
// Grids use a fixed maximum width (1024 pixels by default): small payloads
// become a single row, larger ones grow downwards. The decoder never needs
// to know the layout rule because PNG records its own dimensions.

use crate::compress::payload::TaggedPayload;
use crate::error::{Error, Result};
use crate::raster::header::{HEADER_LEN, PayloadHeader};

/// Default upper bound on grid width, in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 1024;

/// Fill value for bytes past the end of the payload.
pub const PAD_BYTE: u8 = 0;

// ---------------------------------------------------------------------------
// Channel mode
// ---------------------------------------------------------------------------

/// How many payload bytes each pixel carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelMode {
    /// One 8-bit sample per pixel.
    #[default]
    Grayscale,
    /// Three 8-bit samples per pixel.
    Rgb,
}

impl ChannelMode {
    pub fn channels(self) -> usize {
        match self {
            Self::Grayscale => 1,
            Self::Rgb => 3,
        }
    }

    pub fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(Self::Grayscale),
            3 => Some(Self::Rgb),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Rgb => "rgb",
        }
    }
}

// ---------------------------------------------------------------------------
// PixelGrid
// ---------------------------------------------------------------------------

/// A `width x height` raster of 8-bit samples, row-major, `channels` samples
/// per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    mode: ChannelMode,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Wrap a flat sample buffer. `data` must hold exactly
    /// `width * height * mode.channels()` bytes.
    pub fn new(width: u32, height: u32, mode: ChannelMode, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(mode.channels()))
            .ok_or_else(|| Error::Image(format!("grid {width}x{height} is too large")))?;
        if data.len() != expected {
            return Err(Error::Image(format!(
                "grid {width}x{height} ({}) needs {expected} bytes, got {}",
                mode.name(),
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            mode,
            data,
        })
    }

    /// Like [`PixelGrid::new`], with the channel count as reported by an
    /// image decoder.
    pub fn from_raw(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self> {
        let mode = ChannelMode::from_channels(channels).ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "image has {channels} channels, expected 1 (grayscale) or 3 (RGB)"
            ))
        })?;
        Self::new(width, height, mode, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> ChannelMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    /// Row-major samples.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Samples of the pixel at (`x`, `y`), or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * c;
        Some(&self.data[start..start + c])
    }

    /// Samples of row `y`.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.width as usize * self.channels();
        let start = y as usize * stride;
        Some(&self.data[start..start + stride])
    }
}

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

/// Grid dimensions for `byte_len` bytes in `mode`, at most `max_width` wide.
///
/// Always satisfies `width * height * channels >= byte_len` and never
/// returns a zero dimension.
pub fn grid_dimensions(byte_len: usize, mode: ChannelMode, max_width: u32) -> Result<(u32, u32)> {
    let c = mode.channels();
    let total_pixels = byte_len.div_ceil(c).max(1);
    let width = (max_width.max(1) as usize).min(total_pixels);
    let height = total_pixels.div_ceil(width);

    let height = u32::try_from(height).map_err(|_| Error::TooLarge {
        size: byte_len as u64,
        limit: u64::from(u32::MAX) * u64::from(max_width.max(1)) * c as u64,
    })?;
    // `width <= max_width`, which is a u32.
    Ok((width as u32, height))
}

// ---------------------------------------------------------------------------
// Pack / unpack
// ---------------------------------------------------------------------------

/// Pack a payload with the default maximum width.
pub fn pack(payload: &TaggedPayload, mode: ChannelMode) -> Result<PixelGrid> {
    pack_with_width(payload, mode, DEFAULT_MAX_WIDTH)
}

/// Pack a payload into a grid at most `max_width` pixels wide.
pub fn pack_with_width(
    payload: &TaggedPayload,
    mode: ChannelMode,
    max_width: u32,
) -> Result<PixelGrid> {
    let header = payload.header().encode();
    let used = HEADER_LEN + payload.body.len();
    let (width, height) = grid_dimensions(used, mode, max_width)?;
    let total = width as usize * height as usize * mode.channels();

    let mut data = Vec::with_capacity(total);
    data.extend_from_slice(&header);
    data.extend_from_slice(&payload.body);
    data.resize(total, PAD_BYTE);

    PixelGrid::new(width, height, mode, data)
}

/// Recover the payload from a grid.
///
/// The body is sliced by the header's `body_length`, never by the padded
/// buffer length.
pub fn unpack(grid: &PixelGrid) -> Result<TaggedPayload> {
    let buf = grid.as_bytes();
    let header = PayloadHeader::decode(buf)?;

    let capacity = (buf.len() - HEADER_LEN) as u64;
    if header.body_length > capacity {
        return Err(Error::HeaderCorrupt(format!(
            "body length {} exceeds the {capacity} bytes a {}x{} {} grid can hold",
            header.body_length,
            grid.width(),
            grid.height(),
            grid.mode().name()
        )));
    }

    let end = HEADER_LEN + header.body_length as usize;
    Ok(TaggedPayload::from_header(&header, buf[HEADER_LEN..end].to_vec()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
