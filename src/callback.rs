//! Callback handler: the surface the transport layer talks to.
//!
//! Flow for an inbound POST:
//! signature check -> (encrypted channels) decrypt -> classify -> typed
//! payload for the business handler; and for the answer:
//! typed reply -> XML -> (encrypted channels) encrypt + fresh signature.
//!
//! Configuration (token, EncodingAESKey, app id) is injected by the
//! surrounding client; this module performs no I/O of its own and a handler
//! can be shared freely across worker tasks.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::{CallbackError, Result};
use crate::parser::{parse_message, CallbackPayload};
use crate::prp::PrpCrypto;
use crate::replies::Reply;
use crate::signer::{check_signature, decode_aes_key, sign};
use crate::xml::{push_cdata, push_text, text_of};

/// Query parameters the platform appends to every callback request.
///
/// Plaintext channels send `signature`; encrypted channels send
/// `msg_signature`. Deserialize this straight from the webhook URL query.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub msg_signature: Option<String>,
    pub timestamp: String,
    pub nonce: String,
    /// Only present on the URL-verification handshake.
    #[serde(default)]
    pub echostr: Option<String>,
}

impl CallbackQuery {
    /// The signature relevant for this channel, preferring `msg_signature`.
    pub fn signature(&self) -> &str {
        self.msg_signature
            .as_deref()
            .or(self.signature.as_deref())
            .unwrap_or_default()
    }
}

enum Mode {
    Plaintext,
    Encrypted { crypto: PrpCrypto, app_id: String },
}

/// Verifies, decrypts and classifies inbound callbacks, and encodes replies.
pub struct CallbackHandler {
    token: String,
    mode: Mode,
}

impl CallbackHandler {
    /// Handler for a channel configured without message encryption.
    pub fn plaintext(token: &str) -> Self {
        Self {
            token: token.to_string(),
            mode: Mode::Plaintext,
        }
    }

    /// Handler for an encrypted channel. `encoding_aes_key` is the 43-char
    /// key from the platform console; `app_id` is the receiver id expected
    /// inside every decrypted frame.
    pub fn encrypted(token: &str, encoding_aes_key: &str, app_id: &str) -> Result<Self> {
        let key = decode_aes_key(encoding_aes_key)?;
        Ok(Self {
            token: token.to_string(),
            mode: Mode::Encrypted {
                crypto: PrpCrypto::new(&key)?,
                app_id: app_id.to_string(),
            },
        })
    }

    /// URL-verification handshake: verify the signature and return the echo
    /// string (decrypted first on encrypted channels).
    pub fn echo(
        &self,
        signature: &str,
        timestamp: &str,
        nonce: &str,
        echostr: &str,
    ) -> Result<String> {
        match &self.mode {
            Mode::Plaintext => {
                check_signature(&self.token, signature, timestamp, nonce)?;
                Ok(echostr.to_string())
            }
            Mode::Encrypted { crypto, app_id } => {
                self.check_msg_signature(signature, timestamp, nonce, echostr)?;
                crypto.decrypt(echostr, app_id)
            }
        }
    }

    /// Verify the request signature, decrypt if configured, and classify the
    /// body into a typed message or event.
    ///
    /// The signature is always checked before any decryption is attempted; a
    /// forged request never reaches the cipher.
    pub fn verify_and_parse(
        &self,
        body: &[u8],
        signature: &str,
        timestamp: &str,
        nonce: &str,
    ) -> Result<CallbackPayload> {
        let payload = match &self.mode {
            Mode::Plaintext => {
                check_signature(&self.token, signature, timestamp, nonce)
                    .inspect_err(|_| warn!("callback signature mismatch"))?;
                parse_message(body)?
            }
            Mode::Encrypted { crypto, app_id } => {
                if body.iter().all(|b| b.is_ascii_whitespace()) {
                    return Err(CallbackError::EmptyPayload);
                }
                let text = std::str::from_utf8(body).map_err(|e| CallbackError::Parse {
                    reason: format!("invalid utf-8: {e}"),
                    raw: body.to_vec(),
                })?;
                let encrypt = text_of(text, "Encrypt").ok_or_else(|| CallbackError::Parse {
                    reason: "missing <Encrypt> element".into(),
                    raw: body.to_vec(),
                })?;
                self.check_msg_signature(signature, timestamp, nonce, &encrypt)
                    .inspect_err(|_| warn!("callback signature mismatch"))?;
                let xml = crypto.decrypt(&encrypt, app_id)?;
                parse_message(xml.as_bytes())?
            }
        };
        debug!(
            from = %payload.envelope().from_user_name,
            "parsed callback payload"
        );
        Ok(payload)
    }

    /// Convenience wrapper over [`Self::verify_and_parse`] taking the
    /// deserialized query parameters.
    pub fn handle(&self, body: &[u8], query: &CallbackQuery) -> Result<CallbackPayload> {
        self.verify_and_parse(body, query.signature(), &query.timestamp, &query.nonce)
    }

    /// Encode a reply for the channel: plain XML for plaintext channels, the
    /// encrypted envelope (ciphertext, fresh signature, timestamp, nonce)
    /// otherwise.
    pub fn encode_reply(&self, reply: &Reply, timestamp: &str, nonce: &str) -> Result<String> {
        let xml = reply.render();
        match &self.mode {
            Mode::Plaintext => Ok(xml),
            Mode::Encrypted { crypto, app_id } => {
                let ciphertext = crypto.encrypt(&xml, app_id)?;
                let msg_signature = sign(&[&self.token, timestamp, nonce, &ciphertext]);
                let mut out = String::with_capacity(ciphertext.len() + 160);
                out.push_str("<xml>");
                push_cdata(&mut out, "Encrypt", &ciphertext);
                push_cdata(&mut out, "MsgSignature", &msg_signature);
                push_text(&mut out, "TimeStamp", timestamp);
                push_cdata(&mut out, "Nonce", nonce);
                out.push_str("</xml>");
                Ok(out)
            }
        }
    }

    fn check_msg_signature(
        &self,
        signature: &str,
        timestamp: &str,
        nonce: &str,
        ciphertext: &str,
    ) -> Result<()> {
        if sign(&[&self.token, timestamp, nonce, ciphertext]) != signature {
            return Err(CallbackError::InvalidSignature);
        }
        Ok(())
    }
}
