#![no_main]
use libfuzzer_sys::fuzz_target;
use sonopix::compress::backend::CodecId;
use sonopix::compress::payload::CompressOptions;
use sonopix::engine::{self, ConvertOptions};
use sonopix::format::AudioFormat;
use sonopix::raster::grid::ChannelMode;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks format, mode, codec and width.
    let flags = data[0];
    let audio = &data[1..];
    let format = if flags & 1 == 0 {
        AudioFormat::Mp3
    } else {
        AudioFormat::Wav
    };
    let mode = if flags & 2 == 0 {
        ChannelMode::Grayscale
    } else {
        ChannelMode::Rgb
    };
    let codec = if flags & 4 == 0 {
        CodecId::Zlib
    } else {
        CodecId::None
    };
    let opts = ConvertOptions {
        mode,
        compress: CompressOptions { codec, level: 1 },
        max_width: u32::from(flags >> 3) + 1,
        verify: false,
        ..Default::default()
    };

    let grid = engine::encode_audio_to_grid_with_options(audio, format, &opts).unwrap();
    let (decoded, decoded_format) = engine::decode_grid_to_audio(&grid).unwrap();
    assert_eq!(decoded, audio);
    assert_eq!(decoded_format, format);
});
