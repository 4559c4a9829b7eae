//! PKCS7-style padding over the protocol's 32-byte block.
//!
//! The wire format pads to 32 bytes, not the AES block size of 16. This is a
//! fixed convention of the platform and must match exactly for interop, which
//! is why the AES layer runs with no padding of its own.

/// Protocol padding block size. Not the AES block size.
pub const BLOCK_SIZE: usize = 32;

/// Pad `data` so its length is a multiple of [`BLOCK_SIZE`].
///
/// A full block of padding is appended when the input is already aligned, so
/// the final byte is always a valid padding marker.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut pad = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    if pad == 0 {
        pad = BLOCK_SIZE;
    }
    let mut out = Vec::with_capacity(data.len() + pad);
    out.extend_from_slice(data);
    out.resize(data.len() + pad, pad as u8);
    out
}

/// Strip the trailing padding from `data`.
///
/// Lenient on purpose: if the final byte is not a plausible padding count
/// (outside `1..=32`, or larger than the input itself) the input is returned
/// unchanged instead of failing. This mirrors the platform's reference
/// implementations and silently accepts corrupt input; the framing checks in
/// the message codec are what actually reject garbage.
pub fn decode(data: &[u8]) -> &[u8] {
    let Some(&last) = data.last() else {
        return data;
    };
    let pad = last as usize;
    if pad < 1 || pad > BLOCK_SIZE || pad > data.len() {
        return data;
    }
    &data[..data.len() - pad]
}
