//! Message crypto codecs.
//!
//! [`PrpCrypto`] is the main callback codec. Its plaintext frame is
//!
//! ```text
//! random(16) | xml_len(4, big endian) | xml | receiver_id
//! ```
//!
//! padded to the 32-byte protocol block, AES-256-CBC encrypted and base64
//! encoded. The trailing receiver id is what stops a ciphertext produced for
//! one app from being replayed against another.
//!
//! [`RefundCrypto`] is the narrower refund-notification codec: same padding,
//! AES-256-ECB, no random/length framing.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::cipher::{CbcCipher, Cipher, EcbCipher};
use crate::errors::{CallbackError, Result};
use crate::pkcs7;

/// Bytes of random prefix in the plaintext frame.
const RANDOM_LEN: usize = 16;
/// Random prefix plus the 4-byte length field.
const HEADER_LEN: usize = RANDOM_LEN + 4;

/// Callback message encryptor/decryptor (AES-256-CBC, framed plaintext).
#[derive(Clone)]
pub struct PrpCrypto {
    cipher: CbcCipher,
}

impl PrpCrypto {
    /// Build a codec from the raw 32-byte AES key. The IV is the first
    /// 16 bytes of the key, per the wire format.
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self {
            cipher: CbcCipher::new(key)?,
        })
    }

    /// Encrypt `xml` for `receiver_id` and return the base64 ciphertext.
    ///
    /// The 16-byte random prefix comes from the OS CSPRNG on every call.
    pub fn encrypt(&self, xml: &str, receiver_id: &str) -> Result<String> {
        let mut nonce = [0u8; RANDOM_LEN];
        OsRng.fill_bytes(&mut nonce);
        self.encrypt_with_nonce(&nonce, xml, receiver_id)
    }

    fn encrypt_with_nonce(
        &self,
        nonce: &[u8; RANDOM_LEN],
        xml: &str,
        receiver_id: &str,
    ) -> Result<String> {
        let xml = xml.as_bytes();
        let mut frame = Vec::with_capacity(HEADER_LEN + xml.len() + receiver_id.len());
        frame.extend_from_slice(nonce);
        frame.extend_from_slice(&(xml.len() as u32).to_be_bytes());
        frame.extend_from_slice(xml);
        frame.extend_from_slice(receiver_id.as_bytes());

        let padded = pkcs7::encode(&frame);
        let ciphertext = self.cipher.encrypt(&padded)?;
        Ok(BASE64.encode(ciphertext))
    }

    /// Decrypt a base64 ciphertext and return the inner XML.
    ///
    /// Fails with [`CallbackError::ReceiverMismatch`] when the embedded
    /// receiver id is not `receiver_id`, and with [`CallbackError::BadFrame`]
    /// when the plaintext does not carry a coherent frame.
    pub fn decrypt(&self, b64_ciphertext: &str, receiver_id: &str) -> Result<String> {
        let ciphertext = BASE64.decode(b64_ciphertext.trim())?;
        let plaintext = self.cipher.decrypt(&ciphertext)?;
        let frame = pkcs7::decode(&plaintext);

        if frame.len() < HEADER_LEN {
            return Err(CallbackError::BadFrame("shorter than frame header"));
        }
        let content = &frame[RANDOM_LEN..];
        let xml_len = u32::from_be_bytes([content[0], content[1], content[2], content[3]]) as usize;
        if content.len() < 4 + xml_len {
            return Err(CallbackError::BadFrame("declared length exceeds payload"));
        }

        let xml = String::from_utf8(content[4..4 + xml_len].to_vec())?;
        let from_id = String::from_utf8(content[4 + xml_len..].to_vec())?;
        if from_id != receiver_id {
            return Err(CallbackError::ReceiverMismatch {
                expected: receiver_id.to_string(),
                got: from_id,
            });
        }
        Ok(xml)
    }
}

/// Refund notification codec (AES-256-ECB, body padded directly).
#[derive(Clone)]
pub struct RefundCrypto {
    cipher: EcbCipher,
}

impl RefundCrypto {
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self {
            cipher: EcbCipher::new(key)?,
        })
    }

    pub fn encrypt(&self, xml: &str) -> Result<String> {
        let padded = pkcs7::encode(xml.as_bytes());
        let ciphertext = self.cipher.encrypt(&padded)?;
        Ok(BASE64.encode(ciphertext))
    }

    pub fn decrypt(&self, b64_ciphertext: &str) -> Result<String> {
        let ciphertext = BASE64.decode(b64_ciphertext.trim())?;
        let plaintext = self.cipher.decrypt(&ciphertext)?;
        Ok(String::from_utf8(pkcs7::decode(&plaintext).to_vec())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";
    const APP_ID: &str = "wx49358fa1a4e43d29";

    #[test]
    fn round_trip() {
        let crypto = PrpCrypto::new(KEY).unwrap();
        for xml in [
            "<xml><MsgType>text</MsgType></xml>",
            "",
            "short",
            &"x".repeat(4096),
        ] {
            let ct = crypto.encrypt(xml, APP_ID).unwrap();
            assert_eq!(crypto.decrypt(&ct, APP_ID).unwrap(), xml);
        }
    }

    #[test]
    fn fresh_nonce_per_call() {
        let crypto = PrpCrypto::new(KEY).unwrap();
        let a = crypto.encrypt("<xml/>", APP_ID).unwrap();
        let b = crypto.encrypt("<xml/>", APP_ID).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn receiver_mismatch_rejected() {
        let crypto = PrpCrypto::new(KEY).unwrap();
        let ct = crypto.encrypt("<xml/>", "app-a").unwrap();
        match crypto.decrypt(&ct, "app-b") {
            Err(CallbackError::ReceiverMismatch { expected, got }) => {
                assert_eq!(expected, "app-b");
                assert_eq!(got, "app-a");
            }
            other => panic!("expected ReceiverMismatch, got {other:?}"),
        }
    }

    #[test]
    fn malformed_base64_rejected() {
        let crypto = PrpCrypto::new(KEY).unwrap();
        assert!(matches!(
            crypto.decrypt("@@not-base64@@", APP_ID),
            Err(CallbackError::Decode(_))
        ));
    }

    #[test]
    fn tampered_ciphertext_never_round_trips() {
        let crypto = PrpCrypto::new(KEY).unwrap();
        let xml = "<xml><Content>hello</Content></xml>";
        let ct = crypto.encrypt(xml, APP_ID).unwrap();
        let mut raw = BASE64.decode(&ct).unwrap();
        for i in 0..raw.len() {
            raw[i] ^= 0x01;
            let mutated = BASE64.encode(&raw);
            if let Ok(out) = crypto.decrypt(&mutated, APP_ID) {
                assert_ne!(out, xml, "flip at byte {i} reproduced the plaintext");
            }
            raw[i] ^= 0x01;
        }
    }

    #[test]
    fn deterministic_with_fixed_nonce() {
        let crypto = PrpCrypto::new(KEY).unwrap();
        let nonce = [7u8; 16];
        let a = crypto.encrypt_with_nonce(&nonce, "<xml/>", APP_ID).unwrap();
        let b = crypto.encrypt_with_nonce(&nonce, "<xml/>", APP_ID).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn refund_round_trip() {
        let crypto = RefundCrypto::new(KEY).unwrap();
        let xml = "<xml><out_refund_no>r001</out_refund_no></xml>";
        let ct = crypto.encrypt(xml).unwrap();
        assert_eq!(crypto.decrypt(&ct).unwrap(), xml);
    }

    #[test]
    fn refund_has_no_frame() {
        // Two encryptions of the same body are identical: no random prefix.
        let crypto = RefundCrypto::new(KEY).unwrap();
        assert_eq!(
            crypto.encrypt("<xml/>").unwrap(),
            crypto.encrypt("<xml/>").unwrap()
        );
    }
}
