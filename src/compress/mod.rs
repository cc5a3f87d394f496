// Payload preparation stages that run before pixel packing.
//
// - `backend`: Pluggable body compressors (zlib, LZMA, passthrough)
// - `delta`:   Byte-wise delta transform for PCM-like data
// - `payload`: Per-format policy application, TaggedPayload build/extract

pub mod backend;
pub mod delta;
pub mod payload;

pub use backend::{CodecId, CompressBackend};
pub use delta::{decode_delta, encode_delta};
pub use payload::{CompressOptions, TaggedPayload, build, extract};
