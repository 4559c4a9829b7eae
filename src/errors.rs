//! Unified error type for the callback security layer.
//!
//! Design notes:
//! - One crate-level enum; every public operation returns `Result<T>`.
//! - Errors carry the offending field (expected/got receiver id, frame reason,
//!   raw XML bytes) but never plaintext-under-encryption or key material.
//! - Nothing here is retried internally. A signature or framing failure is
//!   fatal for that request; retry policy belongs to the transport layer.

use thiserror::Error;

/// Errors produced while verifying, decrypting, parsing or encoding
/// callback messages.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The recomputed SHA1 signature does not match the one supplied in the
    /// webhook query parameters. Deliberately carries no detail about how
    /// the two differ.
    #[error("invalid signature")]
    InvalidSignature,

    /// Key material has the wrong length for AES-256 (or the EncodingAESKey
    /// did not decode to 32 bytes). Only the length is reported.
    #[error("invalid aes key length: {0}")]
    InvalidKey(usize),

    /// Cipher input is not a multiple of the AES block size. With correct
    /// padding this cannot happen; it indicates a caller bug.
    #[error("cipher input not block aligned: {0} bytes")]
    Misaligned(usize),

    /// The base64 ciphertext could not be decoded.
    #[error("invalid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The decrypted plaintext does not follow the
    /// `random(16) | len(4) | xml | receiver_id` frame.
    #[error("bad message frame: {0}")]
    BadFrame(&'static str),

    /// The receiver id embedded in the encrypted frame is not ours. A message
    /// encrypted for another app must not be accepted even if the key matches.
    #[error("message addressed to '{got}', expected '{expected}'")]
    ReceiverMismatch { expected: String, got: String },

    /// The webhook body (or decrypted payload) was empty.
    #[error("empty message payload")]
    EmptyPayload,

    /// The XML envelope could not be parsed. The original bytes are kept for
    /// diagnostics but are not part of the display output.
    #[error("parse message error: {reason}")]
    Parse { reason: String, raw: Vec<u8> },

    /// Decrypted or extracted bytes were not valid UTF-8.
    #[error("utf8 decode error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The business collaborator requested a reply variant this encoder does
    /// not support. Programmer error; should not occur in normal operation.
    #[error("unsupported reply type: {0}")]
    UnsupportedReply(String),
}

pub type Result<T> = std::result::Result<T, CallbackError>;
