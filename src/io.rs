// File-level helpers for audio <-> PNG conversion.
//
// Provides `encode_file()` and `decode_file()` convenience functions that
// wrap the in-memory engine with input validation, output naming, and
// stats. Optionally computes SHA-256 digests of the bytes read and written
// (feature-gated behind `file-io`).

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::engine::{self, ConvertOptions};
use crate::error::{Error, Result};
use crate::format::{self, AudioFormat};
use crate::raster::grid::ChannelMode;
use crate::raster::png_io;

/// Suffixes appended to generated PNG names, per channel mode.
const GRAY_SUFFIX: &str = "_gray";
const COLOR_SUFFIX: &str = "_color";

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// Path the PNG was written to.
    pub output: PathBuf,
    /// Detected input format.
    pub format: AudioFormat,
    /// Channel mode of the written image.
    pub mode: ChannelMode,
    /// Audio file size in bytes.
    pub input_size: u64,
    /// PNG file size in bytes.
    pub png_size: u64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// SHA-256 of the audio file (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

impl EncodeStats {
    /// PNG size relative to the audio size.
    pub fn ratio(&self) -> f64 {
        if self.input_size == 0 {
            0.0
        } else {
            self.png_size as f64 / self.input_size as f64
        }
    }
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Path the audio was written to.
    pub output: PathBuf,
    /// Format recovered from the header.
    pub format: AudioFormat,
    /// PNG file size in bytes.
    pub png_size: u64,
    /// Reconstructed audio size in bytes.
    pub output_size: u64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// SHA-256 of the reconstructed audio (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Output naming
// ---------------------------------------------------------------------------

/// `<dir>/<stem>_gray.png` or `<dir>/<stem>_color.png` next to the input.
pub fn default_png_path(input: &Path, mode: ChannelMode) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    let suffix = match mode {
        ChannelMode::Grayscale => GRAY_SUFFIX,
        ChannelMode::Rgb => COLOR_SUFFIX,
    };
    input.with_file_name(format!("{stem}{suffix}.png"))
}

/// `<dir>/<stem>.<ext>` next to the PNG, dropping a generated mode suffix.
pub fn default_audio_path(png: &Path, format: AudioFormat) -> PathBuf {
    let stem = png
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    let stem = stem
        .strip_suffix(GRAY_SUFFIX)
        .or_else(|| stem.strip_suffix(COLOR_SUFFIX))
        .unwrap_or(&stem);
    png.with_file_name(format!("{stem}.{}", format.extension()))
}

// ---------------------------------------------------------------------------
// encode_file
// ---------------------------------------------------------------------------

/// Convert an audio file into a PNG.
///
/// The format is taken from the extension and checked against the content;
/// `force_format` skips the content check. When `output` is `None` the PNG
/// is written next to the input (see [`default_png_path`]). An existing
/// output file is only replaced when `overwrite` is set.
pub fn encode_file(
    input: &Path,
    output: Option<&Path>,
    opts: &ConvertOptions,
    force_format: bool,
    overwrite: bool,
) -> Result<EncodeStats> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_png_path(input, opts.mode));
    check_overwrite(&output, overwrite)?;

    let audio = read_limited(input, opts.max_input_size)?;
    let format = format::detect(input, &audio, force_format)?;
    log::info!(
        "{}: {format}, {} bytes, {} mode",
        input.display(),
        audio.len(),
        opts.mode.name()
    );

    let grid = engine::encode_audio_to_grid_with_options(&audio, format, opts)?;
    log::debug!(
        "{}: grid {}x{} ({} bytes)",
        input.display(),
        grid.width(),
        grid.height(),
        grid.as_bytes().len()
    );
    let png = png_io::write_png(&grid)?;

    fs::write(&output, &png)?;
    log::info!("wrote {} ({} bytes)", output.display(), png.len());

    Ok(EncodeStats {
        output,
        format,
        mode: opts.mode,
        input_size: audio.len() as u64,
        png_size: png.len() as u64,
        width: grid.width(),
        height: grid.height(),
        input_sha256: sha256(&audio),
    })
}

// ---------------------------------------------------------------------------
// decode_file
// ---------------------------------------------------------------------------

/// Convert a PNG produced by [`encode_file`] back into the audio file.
///
/// When `output` is `None` the file extension comes from the format stored
/// in the image (see [`default_audio_path`]). An existing output file is
/// only replaced when `overwrite` is set.
pub fn decode_file(input: &Path, output: Option<&Path>, overwrite: bool) -> Result<DecodeStats> {
    let png = fs::read(input)?;
    if png.is_empty() {
        return Err(Error::EmptyInput);
    }

    let grid = png_io::read_png(&png)?;
    log::debug!(
        "{}: grid {}x{} ({})",
        input.display(),
        grid.width(),
        grid.height(),
        grid.mode().name()
    );
    let (audio, format) = engine::decode_grid_to_audio(&grid)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_audio_path(input, format));
    check_overwrite(&output, overwrite)?;
    fs::write(&output, &audio)?;
    log::info!(
        "wrote {} ({format}, {} bytes)",
        output.display(),
        audio.len()
    );

    Ok(DecodeStats {
        output,
        format,
        png_size: png.len() as u64,
        output_size: audio.len() as u64,
        width: grid.width(),
        height: grid.height(),
        output_sha256: sha256(&audio),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read a whole file, rejecting empty files and files over `limit` bytes
/// before touching their content.
fn read_limited(path: &Path, limit: u64) -> Result<Vec<u8>> {
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        )));
    }
    let size = meta.len();
    if size == 0 {
        return Err(Error::EmptyInput);
    }
    if size > limit {
        return Err(Error::TooLarge { size, limit });
    }
    Ok(fs::read(path)?)
}

fn check_overwrite(output: &Path, overwrite: bool) -> Result<()> {
    if !overwrite && output.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("output file exists, use -f to overwrite: {}", output.display()),
        )));
    }
    Ok(())
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

/// Lowercase hex rendering of a digest.
pub fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
