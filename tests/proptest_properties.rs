use proptest::prelude::*;
use sonopix::compress::backend::CodecId;
use sonopix::compress::delta::{decode_delta, encode_delta};
use sonopix::compress::payload::{self, CompressOptions};
use sonopix::engine::{self, ConvertOptions};
use sonopix::format::AudioFormat;
use sonopix::raster::grid::{self, ChannelMode};
use sonopix::raster::header::HEADER_LEN;

fn any_format() -> impl Strategy<Value = AudioFormat> {
    prop_oneof![Just(AudioFormat::Mp3), Just(AudioFormat::Wav)]
}

fn any_mode() -> impl Strategy<Value = ChannelMode> {
    prop_oneof![Just(ChannelMode::Grayscale), Just(ChannelMode::Rgb)]
}

fn any_codec() -> impl Strategy<Value = CodecId> {
    prop_oneof![Just(CodecId::None), Just(CodecId::Zlib), Just(CodecId::Lzma)]
}

fn opts(mode: ChannelMode, codec: CodecId, level: u32, max_width: u32) -> ConvertOptions {
    ConvertOptions {
        mode,
        compress: CompressOptions { codec, level },
        max_width,
        verify: false,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn prop_delta_is_invertible(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let encoded = encode_delta(&data);
        prop_assert_eq!(encoded.len(), data.len());
        prop_assert_eq!(decode_delta(&encoded), data);
    }

    #[test]
    fn prop_grid_roundtrip(
        audio in proptest::collection::vec(any::<u8>(), 0..8192),
        format in any_format(),
        mode in any_mode(),
        level in 0u32..=9u32,
        max_width in 1u32..=300u32
    ) {
        let o = opts(mode, CodecId::Zlib, level, max_width);
        let grid = engine::encode_audio_to_grid_with_options(&audio, format, &o).unwrap();
        let (decoded, decoded_format) = engine::decode_grid_to_audio(&grid).unwrap();
        prop_assert_eq!(decoded, audio);
        prop_assert_eq!(decoded_format, format);
    }

    #[test]
    fn prop_codec_choice_is_recorded(
        audio in proptest::collection::vec(any::<u8>(), 0..2048),
        codec in any_codec()
    ) {
        prop_assume!(cfg!(feature = "lzma") || codec != CodecId::Lzma);
        let p = payload::build(&audio, AudioFormat::Wav, &CompressOptions { codec, level: 6 }).unwrap();
        prop_assert_eq!(p.codec, codec);
        prop_assert_eq!(p.compressed, codec != CodecId::None);
        prop_assert!(p.delta_encoded);
        prop_assert_eq!(payload::extract(&p).unwrap(), audio);
    }

    #[test]
    fn prop_mp3_body_is_verbatim(audio in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let p = payload::build(&audio, AudioFormat::Mp3, &CompressOptions::default()).unwrap();
        prop_assert!(!p.compressed);
        prop_assert!(!p.delta_encoded);
        prop_assert_eq!(&p.body, &audio);
    }

    #[test]
    fn prop_grid_is_tight(
        audio in proptest::collection::vec(any::<u8>(), 0..8192),
        format in any_format(),
        mode in any_mode(),
        max_width in 1u32..=512u32
    ) {
        let o = opts(mode, CodecId::Zlib, 6, max_width);
        let p = payload::build(&audio, format, &o.compress).unwrap();
        let grid = grid::pack_with_width(&p, mode, max_width).unwrap();

        let used = HEADER_LEN + p.body.len();
        let capacity = grid.as_bytes().len();
        let row_bytes = grid.width() as usize * mode.channels();
        prop_assert!(grid.width() <= max_width);
        prop_assert!(grid.width() >= 1 && grid.height() >= 1);
        prop_assert!(capacity >= used);
        prop_assert!(capacity - used < row_bytes);
        prop_assert!(grid.as_bytes()[used..].iter().all(|&b| b == 0));
    }

    #[test]
    fn prop_mode_does_not_change_recovered_audio(
        audio in proptest::collection::vec(any::<u8>(), 0..4096),
        format in any_format()
    ) {
        let gray = engine::encode_audio_to_grid(&audio, format, ChannelMode::Grayscale).unwrap();
        let rgb = engine::encode_audio_to_grid(&audio, format, ChannelMode::Rgb).unwrap();
        prop_assert_eq!(
            engine::decode_grid_to_audio(&gray).unwrap(),
            engine::decode_grid_to_audio(&rgb).unwrap()
        );
    }

    #[test]
    fn prop_random_pixels_never_panic(
        data in proptest::collection::vec(any::<u8>(), 1..2048),
        rgb in any::<bool>()
    ) {
        let mode = if rgb { ChannelMode::Rgb } else { ChannelMode::Grayscale };
        let pixels = data.len() / mode.channels();
        prop_assume!(pixels > 0);
        let bytes = data[..pixels * mode.channels()].to_vec();
        let grid = grid::PixelGrid::new(pixels as u32, 1, mode, bytes).unwrap();
        let _ = engine::decode_grid_to_audio(&grid);
    }
}
