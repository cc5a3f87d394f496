//! Sonopix: lossless MP3/WAV <-> PNG conversion in Rust.
//!
//! Audio bytes are wrapped in a small self-describing header, optionally
//! delta-encoded and compressed (WAV), and laid out as the samples of an
//! 8-bit grayscale or RGB image. Reversing the process yields the original
//! file byte for byte.
//!
//! The crate provides:
//! - Payload preparation: delta transform, compression backends (`compress`)
//! - Header, pixel packing, and PNG I/O (`raster`)
//! - In-memory conversion APIs (`engine`)
//! - Container detection (`format`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use sonopix::engine;
//! use sonopix::format::AudioFormat;
//! use sonopix::raster::ChannelMode;
//!
//! let audio = std::fs::read("song.mp3").unwrap();
//! let grid = engine::encode_audio_to_grid(&audio, AudioFormat::Mp3, ChannelMode::Rgb).unwrap();
//! let (restored, format) = engine::decode_grid_to_audio(&grid).unwrap();
//! assert_eq!(restored, audio);
//! assert_eq!(format, AudioFormat::Mp3);
//! ```

pub mod compress;
pub mod engine;
pub mod error;
pub mod format;
pub mod io;
pub mod raster;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
