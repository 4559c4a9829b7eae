#![doc = r#"
wxcallback-rs

Security layer for WeChat Official Account / Mini Program callbacks:
signature verification, message encryption/decryption (the AES-256-CBC
"aes" message crypto with its 32-byte padding and framed plaintext),
XML message/event classification and passive-reply encoding.

This crate deliberately stops at the callback boundary. Fetching access
tokens, uploading media and calling the remote HTTP API belong to the
surrounding client, which injects the configuration (token,
EncodingAESKey, app id) here and receives typed payloads back.

Quick usage:

```ignore
use wxcallback_rs::{CallbackHandler, CallbackPayload, Message, Reply, ReplyBody};

let handler = CallbackHandler::encrypted(token, encoding_aes_key, app_id)?;

// Inbound: verify signature, decrypt, classify.
let payload = handler.verify_and_parse(body, msg_signature, timestamp, nonce)?;
if let CallbackPayload::Message(Message::Text { content, .. }) = &payload {
    // Outbound: typed reply, rendered and re-encrypted for the channel.
    let reply = Reply::to_payload(&payload, ReplyBody::Text { content: content.clone() });
    let response_body = handler.encode_reply(&reply, timestamp, nonce)?;
}
```
"#]

pub mod callback;
pub mod cipher;
pub mod errors;
pub mod events;
pub mod keygen;
pub mod messages;
pub mod parser;
pub mod pkcs7;
pub mod prp;
pub mod replies;
pub mod signer;

mod xml;

pub use callback::{CallbackHandler, CallbackQuery};
pub use errors::{CallbackError, Result};
pub use events::Event;
pub use messages::{Envelope, Message};
pub use parser::{parse_message, CallbackPayload};
pub use prp::{PrpCrypto, RefundCrypto};
pub use replies::{create_reply, Article, Reply, ReplyBody};
pub use signer::{check_signature, check_wxa_signature, Signer};
