// Raster side of the codec.
//
// - `header`: Fixed-width payload header at offset 0 of the pixel buffer
// - `grid`:   PixelGrid, channel modes, grid sizing, pack/unpack
// - `png_io`: PNG encode/decode of raw 8-bit grayscale/RGB grids

pub mod grid;
pub mod header;
pub mod png_io;

pub use grid::{ChannelMode, PixelGrid, pack, unpack};
pub use header::{HEADER_LEN, PayloadFlags, PayloadHeader};
pub use png_io::{read_png, write_png};
