//! Credential generation for callback configuration.
//!
//! Generates the two values entered in the platform console:
//! - Token: alphanumeric, at most 32 chars, used for signature verification.
//! - EncodingAESKey: 43 base64 chars (alphanumeric only, per the console's
//!   input rules) that decode to the 32-byte AES key.
//!
//! Everything here draws from the OS CSPRNG. Credentials are long-lived
//! secrets; a seeded convenience generator has no business producing them.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};

use crate::signer::decode_aes_key;

const ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate an alphanumeric token of `len` chars (clamped to `1..=32`;
/// 0 defaults to 32).
pub fn generate_token(len: usize) -> String {
    let len = if len == 0 || len > 32 { 32 } else { len };
    let mut rng = OsRng;
    (0..len)
        .map(|_| ALNUM[rng.gen_range(0..ALNUM.len())] as char)
        .collect()
}

/// Generate a 43-char EncodingAESKey.
///
/// The console accepts only letters and digits, so keys whose base64 form
/// contains `+` or `/` are rejection-sampled away.
pub fn generate_encoding_aes_key() -> String {
    let mut rng = OsRng;
    loop {
        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);
        let encoded = BASE64.encode(key);
        let trimmed = encoded.trim_end_matches('=');
        if trimmed.len() == 43 && trimmed.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return trimmed.to_string();
        }
    }
}

/// Check that a configured EncodingAESKey has the expected shape:
/// 43 chars decoding to exactly 32 bytes.
pub fn verify_encoding_aes_key(key: &str) -> bool {
    key.len() == 43 && decode_aes_key(key).is_ok()
}
