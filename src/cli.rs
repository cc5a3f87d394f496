// Command-line interface for Sonopix.
//
// Subcommands map directly onto the file helpers in `io`: `encode` turns
// audio files into PNGs, `decode` reverses it, `inspect` prints the header
// stored in an image and `config` prints build details.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::compress::backend::{CodecId, DEFAULT_ZLIB_LEVEL};
use crate::compress::payload::CompressOptions;
use crate::engine::{self, ConvertOptions, DEFAULT_MAX_INPUT_SIZE};
use crate::error::Result;
use crate::io::{self as file_io, DecodeStats, EncodeStats};
use crate::raster::grid::{ChannelMode, DEFAULT_MAX_WIDTH};
use crate::raster::header::{HEADER_LEN, PayloadFlags};

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Lossless MP3/WAV <-> PNG converter.
#[derive(Parser, Debug)]
#[command(
    name = "sonopix",
    version,
    about = "Lossless MP3/WAV to PNG converter",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Convert audio files (MP3/WAV) into PNG images.
    Encode(EncodeArgs),
    /// Convert PNG images back into the original audio files.
    Decode(DecodeArgs),
    /// Print the payload header stored in a PNG image.
    Inspect(InspectArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CodecArg {
    None,
    Zlib,
    Lzma,
}

impl From<CodecArg> for CodecId {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::None => CodecId::None,
            CodecArg::Zlib => CodecId::Zlib,
            CodecArg::Lzma => CodecId::Lzma,
        }
    }
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Pack three bytes per pixel (RGB) instead of one (grayscale).
    #[arg(long)]
    rgb: bool,

    /// Compression level for WAV bodies (0-9).
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(0..=9), default_value_t = DEFAULT_ZLIB_LEVEL)]
    level: u32,

    /// Compressor for WAV bodies.
    #[arg(long, value_enum, default_value_t = CodecArg::Zlib)]
    codec: CodecArg,

    /// Maximum image width in pixels.
    #[arg(long = "max-width", value_parser = clap::value_parser!(u32).range(1..), default_value_t = DEFAULT_MAX_WIDTH)]
    max_width: u32,

    /// Largest accepted input file (supports K/M/G suffix).
    #[arg(long = "max-size", value_parser = parse_byte_size, default_value_t = DEFAULT_MAX_INPUT_SIZE)]
    max_size: u64,

    /// Trust the file extension without validating the audio header.
    #[arg(long = "force-format")]
    force_format: bool,

    /// Skip decoding the packed image to verify it before writing.
    #[arg(long = "no-verify")]
    no_verify: bool,

    /// Output PNG (only with a single input; default: <stem>_gray.png / <stem>_color.png).
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Input audio files.
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Output audio file (only with a single input; default: <stem>.<mp3|wav>).
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Input PNG files.
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// PNG image to inspect.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved global options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Globals {
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
}

fn build_convert_options(args: &EncodeArgs) -> ConvertOptions {
    ConvertOptions {
        mode: if args.rgb {
            ChannelMode::Rgb
        } else {
            ChannelMode::Grayscale
        },
        compress: CompressOptions {
            codec: args.codec.into(),
            level: args.level,
        },
        max_width: args.max_width,
        max_input_size: args.max_size,
        verify: !args.no_verify,
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("sonopix".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        if let Cmd::Encode(args) = &cli.command {
            let _ = build_convert_options(args);
        }
    }
}

// ---------------------------------------------------------------------------
// Batch helper
// ---------------------------------------------------------------------------

/// Run `f` over every input, in parallel when the `parallel` feature is on.
/// Results keep the input order.
fn for_each_input<T, F>(inputs: &[PathBuf], f: F) -> Vec<(PathBuf, Result<T>)>
where
    T: Send,
    F: Fn(&Path) -> Result<T> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        inputs.par_iter().map(|p| (p.clone(), f(p))).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        inputs.iter().map(|p| (p.clone(), f(p))).collect()
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => eprintln!("{s}"),
        Err(e) => eprintln!("sonopix: JSON error: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("sonopix version {version} (Rust), Copyright (C) sonopix contributors");
    eprintln!("Licensed under the MIT License");

    let lzma = cfg!(feature = "lzma") as u8;
    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;

    eprintln!("CODEC_LZMA={lzma}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("HEADER_LEN={HEADER_LEN}");
    eprintln!("DEFAULT_LEVEL={DEFAULT_ZLIB_LEVEL}");
    eprintln!("DEFAULT_MAX_WIDTH={DEFAULT_MAX_WIDTH}");
    eprintln!("DEFAULT_MAX_INPUT_SIZE={DEFAULT_MAX_INPUT_SIZE}");

    0
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn cmd_encode(args: &EncodeArgs, g: Globals) -> i32 {
    if args.output.is_some() && args.inputs.len() > 1 {
        eprintln!("sonopix: --output can only be used with a single input");
        return 1;
    }

    let opts = build_convert_options(args);
    let output = args.output.as_deref();
    let results = for_each_input(&args.inputs, |input| {
        file_io::encode_file(input, output, &opts, args.force_format, g.force)
    });

    let mut status = 0;
    for (input, result) in results {
        match result {
            Ok(stats) => report_encode(&input, &stats, g),
            Err(e) => {
                eprintln!("sonopix: {}: {e}", input.display());
                status = 1;
            }
        }
    }
    status
}

fn report_encode(input: &Path, stats: &EncodeStats, g: Globals) {
    if !g.quiet {
        eprintln!(
            "sonopix: {} -> {} ({}, {}x{} {}, {} -> {} bytes, {:.2}%)",
            input.display(),
            stats.output.display(),
            stats.format,
            stats.width,
            stats.height,
            stats.mode.name(),
            stats.input_size,
            stats.png_size,
            stats.ratio() * 100.0
        );
    }
    if g.verbose > 0 && !g.quiet {
        if let Some(digest) = stats.input_sha256 {
            eprintln!("sonopix: input sha256: {}", file_io::hex(&digest));
        }
    }
    if g.json_output {
        print_json(&serde_json::json!({
            "command": "encode",
            "input": input.display().to_string(),
            "output": stats.output.display().to_string(),
            "format": stats.format.extension(),
            "mode": stats.mode.name(),
            "width": stats.width,
            "height": stats.height,
            "input_size": stats.input_size,
            "png_size": stats.png_size,
            "input_sha256": stats.input_sha256.map(|d| file_io::hex(&d)),
        }));
    }
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(args: &DecodeArgs, g: Globals) -> i32 {
    if args.output.is_some() && args.inputs.len() > 1 {
        eprintln!("sonopix: --output can only be used with a single input");
        return 1;
    }

    let output = args.output.as_deref();
    let results = for_each_input(&args.inputs, |input| {
        file_io::decode_file(input, output, g.force)
    });

    let mut status = 0;
    for (input, result) in results {
        match result {
            Ok(stats) => report_decode(&input, &stats, g),
            Err(e) => {
                eprintln!("sonopix: {}: {e}", input.display());
                status = 1;
            }
        }
    }
    status
}

fn report_decode(input: &Path, stats: &DecodeStats, g: Globals) {
    if !g.quiet {
        eprintln!(
            "sonopix: {} -> {} ({}, {} bytes)",
            input.display(),
            stats.output.display(),
            stats.format,
            stats.output_size
        );
    }
    if g.verbose > 0 && !g.quiet {
        if let Some(digest) = stats.output_sha256 {
            eprintln!("sonopix: output sha256: {}", file_io::hex(&digest));
        }
    }
    if g.json_output {
        print_json(&serde_json::json!({
            "command": "decode",
            "input": input.display().to_string(),
            "output": stats.output.display().to_string(),
            "format": stats.format.extension(),
            "width": stats.width,
            "height": stats.height,
            "png_size": stats.png_size,
            "output_size": stats.output_size,
            "output_sha256": stats.output_sha256.map(|d| file_io::hex(&d)),
        }));
    }
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(args: &InspectArgs, g: Globals) -> i32 {
    let png = match std::fs::read(&args.input) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("sonopix: input file: {}: {e}", args.input.display());
            return 1;
        }
    };
    let info = match engine::inspect_png(&png) {
        Ok(info) => info,
        Err(e) => {
            eprintln!("sonopix: {}: {e}", args.input.display());
            return 1;
        }
    };

    let h = &info.header;
    let delta = h.flags.contains(PayloadFlags::DELTA);
    let compressed = h.flags.contains(PayloadFlags::COMPRESSED);

    if g.json_output {
        print_json(&serde_json::json!({
            "command": "inspect",
            "input": args.input.display().to_string(),
            "width": info.width,
            "height": info.height,
            "mode": info.mode.name(),
            "format": h.format.extension(),
            "delta_encoded": delta,
            "compressed": compressed,
            "codec": h.codec.name(),
            "original_length": h.original_length,
            "body_length": h.body_length,
            "padding": info.padding(),
            "crc32": format!("{:08x}", h.checksum),
        }));
    } else {
        println!("image:           {}x{} {}", info.width, info.height, info.mode.name());
        println!("format:          {}", h.format);
        println!("delta encoded:   {delta}");
        println!("compressed:      {compressed} ({})", h.codec);
        println!("original length: {}", h.original_length);
        println!("body length:     {}", h.body_length);
        println!("padding:         {}", info.padding());
        println!("crc32:           {:08x}", h.checksum);
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    let cli = Cli::parse();

    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let g = Globals {
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
    };

    let exit_code = match &cli.command {
        Cmd::Encode(args) => cmd_encode(args, g),
        Cmd::Decode(args) => cmd_decode(args, g),
        Cmd::Inspect(args) => cmd_inspect(args, g),
        Cmd::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
