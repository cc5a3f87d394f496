#![no_main]
use libfuzzer_sys::fuzz_target;
use sonopix::engine;
use sonopix::raster::grid::{ChannelMode, PixelGrid};

fuzz_target!(|data: &[u8]| {
    // Treat the input as raw pixel bytes of a single-row grid in both modes.
    for mode in [ChannelMode::Grayscale, ChannelMode::Rgb] {
        let channels = mode.channels();
        let pixels = data.len() / channels;
        if pixels == 0 {
            continue;
        }
        let bytes = data[..pixels * channels].to_vec();
        if let Ok(grid) = PixelGrid::new(pixels as u32, 1, mode, bytes) {
            let _ = engine::decode_grid_to_audio(&grid);
        }
    }
});
