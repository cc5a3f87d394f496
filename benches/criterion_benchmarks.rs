use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sonopix::compress::backend::CodecId;
use sonopix::compress::delta;
use sonopix::compress::payload::CompressOptions;
use sonopix::engine::{self, ConvertOptions};
use sonopix::format::AudioFormat;
use sonopix::raster::grid::ChannelMode;
use std::fs;
use std::path::Path;

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

/// 8-bit PCM-like signal: a slow sine with a little LCG noise.
fn gen_pcm(size: usize, seed: u64) -> Vec<u8> {
    let noise = gen_data(size, seed);
    (0..size)
        .map(|i| {
            let wave = (i as f64 * 0.02).sin() * 96.0 + 128.0;
            (wave as u8).wrapping_add(noise[i] & 0x03)
        })
        .collect()
}

fn opts(level: u32) -> ConvertOptions {
    ConvertOptions {
        compress: CompressOptions {
            codec: CodecId::Zlib,
            level,
        },
        verify: false,
        ..Default::default()
    }
}

fn write_ratio_snapshot() {
    let audio = gen_pcm(2 * 1024 * 1024, 123);
    let mut csv = String::from("level,png_bytes,audio_bytes,ratio\n");
    for level in 0u32..=9 {
        let png = engine::encode_audio_to_png(&audio, AudioFormat::Wav, &opts(level)).unwrap();
        let ratio = png.len() as f64 / audio.len() as f64;
        csv.push_str(&format!("{level},{},{},{}\n", png.len(), audio.len(), ratio));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_encode_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("encode_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let wav = gen_pcm(size, 1);
        let mp3 = gen_data(size, 1);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::new("wav", size), &size, |b, _| {
            b.iter(|| {
                let grid = engine::encode_audio_to_grid_with_options(
                    black_box(&wav),
                    AudioFormat::Wav,
                    &opts(6),
                )
                .unwrap();
                black_box(grid);
            });
        });
        g.bench_with_input(BenchmarkId::new("mp3", size), &size, |b, _| {
            b.iter(|| {
                let grid = engine::encode_audio_to_grid_with_options(
                    black_box(&mp3),
                    AudioFormat::Mp3,
                    &opts(6),
                )
                .unwrap();
                black_box(grid);
            });
        });
    }
    g.finish();
}

fn bench_decode_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decode_speed_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let audio = gen_pcm(size, 2);
        let grid = engine::encode_audio_to_grid_with_options(&audio, AudioFormat::Wav, &opts(6))
            .unwrap();
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let out = engine::decode_grid_to_audio(black_box(&grid)).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_png_roundtrip(c: &mut Criterion) {
    let mut g = c.benchmark_group("png_roundtrip");
    let audio = gen_pcm(1024 * 1024, 3);
    for mode in [ChannelMode::Grayscale, ChannelMode::Rgb] {
        let o = ConvertOptions {
            mode,
            ..opts(6)
        };
        g.throughput(Throughput::Bytes(audio.len() as u64));
        g.bench_function(mode.name(), |b| {
            b.iter(|| {
                let png = engine::encode_audio_to_png(black_box(&audio), AudioFormat::Wav, &o)
                    .unwrap();
                let out = engine::decode_png_to_audio(&png).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_ratio_vs_level(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("compression_ratio_vs_level");
    let audio = gen_pcm(512 * 1024, 4);
    for level in [0u32, 1, 6, 9] {
        g.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, level| {
            b.iter(|| {
                let grid = engine::encode_audio_to_grid_with_options(
                    &audio,
                    AudioFormat::Wav,
                    &opts(*level),
                )
                .unwrap();
                let ratio = grid.as_bytes().len() as f64 / audio.len() as f64;
                black_box(ratio);
            });
        });
    }
    g.finish();
}

fn bench_delta(c: &mut Criterion) {
    let mut g = c.benchmark_group("delta_transform");
    for size in [64 * 1024usize, 4 * 1024 * 1024] {
        let audio = gen_pcm(size, 5);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::new("encode", size), &size, |b, _| {
            b.iter(|| black_box(delta::encode_delta(black_box(&audio))));
        });
        let encoded = delta::encode_delta(&audio);
        g.bench_with_input(BenchmarkId::new("decode", size), &size, |b, _| {
            b.iter(|| black_box(delta::decode_delta(black_box(&encoded))));
        });
    }
    g.finish();
}

criterion_group!(
    benches,
    bench_encode_speed,
    bench_decode_speed,
    bench_png_roundtrip,
    bench_ratio_vs_level,
    bench_delta
);
criterion_main!(benches);
