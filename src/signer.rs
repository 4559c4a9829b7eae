//! SHA1 signatures for webhook verification and mini program data checks.
//!
//! The platform signs a small set of shared-secret tokens: sort them
//! lexicographically, join, SHA1, lowercase hex. Webhook checks join with the
//! empty string; other surfaces (e.g. JS-SDK) join with a delimiter, so the
//! signer keeps it configurable.

use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine};
use sha1::{Digest, Sha1};

use crate::errors::{CallbackError, Result};

/// Accumulates tokens and produces the order-independent SHA1 signature.
#[derive(Debug, Default, Clone)]
pub struct Signer {
    data: Vec<String>,
    delimiter: &'static str,
}

impl Signer {
    pub fn new(delimiter: &'static str) -> Self {
        Self {
            data: Vec::new(),
            delimiter,
        }
    }

    pub fn add_data<I, S>(&mut self, parts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.extend(parts.into_iter().map(Into::into));
    }

    /// Sort, join and hash the collected tokens.
    pub fn signature(&self) -> String {
        let mut parts: Vec<&str> = self.data.iter().map(String::as_str).collect();
        parts.sort_unstable();
        let digest = Sha1::digest(parts.join(self.delimiter).as_bytes());
        base16ct::lower::encode_string(&digest)
    }
}

/// Compute the webhook signature over an arbitrary token set (empty joiner).
pub fn sign(parts: &[&str]) -> String {
    let mut signer = Signer::new("");
    signer.add_data(parts.iter().copied());
    signer.signature()
}

/// Verify the signature attached to a callback request.
///
/// Recomputes the signature over `(token, timestamp, nonce)` and compares it
/// with the client-supplied value. The comparison result is all a caller
/// learns; the expected digest is never part of the error.
pub fn check_signature(token: &str, signature: &str, timestamp: &str, nonce: &str) -> Result<()> {
    if sign(&[token, timestamp, nonce]) != signature {
        return Err(CallbackError::InvalidSignature);
    }
    Ok(())
}

/// Verify the `rawData` signature a mini program client asserts.
///
/// The client signs `rawData + session_key`; the session key comes from the
/// login exchange and never leaves the server side of this check.
pub fn check_wxa_signature(session_key: &str, raw_data: &str, client_signature: &str) -> Result<()> {
    let mut hasher = Sha1::new();
    hasher.update(raw_data.as_bytes());
    hasher.update(session_key.as_bytes());
    let digest = hasher.finalize();
    if base16ct::lower::encode_string(&digest) != client_signature {
        return Err(CallbackError::InvalidSignature);
    }
    Ok(())
}

/// Decode a 43-character `EncodingAESKey` into the 32-byte AES key.
///
/// The configured key is standard base64 with the trailing `=` stripped. Keys
/// issued by the platform are known to carry dangling trailing bits, so the
/// decoder must tolerate them; the decoded length is checked strictly instead.
pub fn decode_aes_key(encoding_aes_key: &str) -> Result<Vec<u8>> {
    let engine = GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
    );
    let mut padded = encoding_aes_key.trim_end_matches('=').to_string();
    padded.push('=');
    let key = engine
        .decode(padded.as_bytes())
        .map_err(CallbackError::Decode)?;
    if key.len() != crate::cipher::KEY_SIZE {
        return Err(CallbackError::InvalidKey(key.len()));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_order_independent() {
        let mut a = Signer::new("");
        a.add_data(["0", "c", "a", "b"]);
        let mut b = Signer::new("");
        b.add_data(["c", "b", "a", "0"]);
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature(), "a8addbc99f8b3f51d2adbceb605d650b9a8940e2");
    }

    #[test]
    fn delimiter_changes_signature() {
        let mut plain = Signer::new("");
        plain.add_data(["a", "b"]);
        let mut amp = Signer::new("&");
        amp.add_data(["a", "b"]);
        assert_ne!(plain.signature(), amp.signature());
        assert_eq!(amp.signature(), "9cea8e74f534363e38537fb94bed4d57eabbcd3e");
    }

    #[test]
    fn webhook_signature_known_vector() {
        let expected = "1629badce34e729c5e524c4e90ee389c2c599169";
        assert_eq!(sign(&["mytoken", "1409659589", "1320562132"]), expected);
        assert!(check_signature("mytoken", expected, "1409659589", "1320562132").is_ok());
    }

    #[test]
    fn single_character_mutation_fails() {
        let good = sign(&["mytoken", "1409659589", "1320562132"]);
        let mut bad = good.clone().into_bytes();
        bad[0] = if bad[0] == b'0' { b'1' } else { b'0' };
        let bad = String::from_utf8(bad).unwrap();
        match check_signature("mytoken", &bad, "1409659589", "1320562132") {
            Err(CallbackError::InvalidSignature) => {}
            other => panic!("expected InvalidSignature, got {other:?}"),
        }
    }

    #[test]
    fn wxa_signature_check() {
        let raw_data = r#"{"nickName":"Band"}"#;
        let session_key = "HyVFkGl5F5OQWJZZaNzBBg==";
        let good = "19036804514e3177482cf7382c6a337cf79b246d";
        assert!(check_wxa_signature(session_key, raw_data, good).is_ok());
        assert!(check_wxa_signature(session_key, raw_data, "deadbeef").is_err());
    }

    #[test]
    fn aes_key_decoding() {
        // 43 alphanumeric chars that decode to 32 bytes once '=' is appended.
        let key = "cGCVnNJRgRu6wDgo7gxG2diBovGnRQq1Tqy4Rm4V4qF";
        assert_eq!(decode_aes_key(key).unwrap().len(), 32);
        assert!(decode_aes_key("dG9vc2hvcnQ").is_err());
    }
}
