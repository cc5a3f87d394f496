#![no_main]
use libfuzzer_sys::fuzz_target;
use sonopix::engine;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a PNG file: only errors, never a panic.
    let _ = engine::decode_png_to_audio(data);
    let _ = engine::inspect_png(data);
});
