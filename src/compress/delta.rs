// Byte-wise delta transform.
//
// Each byte is replaced by its difference from the preceding byte, modulo
// 256. PCM sample streams change slowly, so the differences cluster near
// zero and deflate much better than the raw samples.

/// Delta-encode `data` into a new buffer.
///
/// `out[0] = data[0]`, `out[i] = data[i] - data[i - 1]` (wrapping).
pub fn encode_delta(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    encode_delta_in_place(&mut out);
    out
}

/// Invert [`encode_delta`].
pub fn decode_delta(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    decode_delta_in_place(&mut out);
    out
}

/// Delta-encode `data` in place.
///
/// Walks backwards so every subtraction still sees the original predecessor.
pub fn encode_delta_in_place(data: &mut [u8]) {
    for i in (1..data.len()).rev() {
        data[i] = data[i].wrapping_sub(data[i - 1]);
    }
}

/// Delta-decode `data` in place (running sum, wrapping).
pub fn decode_delta_in_place(data: &mut [u8]) {
    let mut acc = 0u8;
    for b in data.iter_mut() {
        acc = acc.wrapping_add(*b);
        *b = acc;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
