//! Outbound reply envelope encoder.
//!
//! A [`Reply`] is built by the business collaborator (usually via
//! [`Reply::to_payload`], which swaps recipient and sender from the inbound
//! message) and rendered once to the passive-reply XML. Whether the channel
//! then wraps the XML in the crypto codec is the callback handler's concern,
//! not the encoder's.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::{CallbackError, Result};
use crate::parser::CallbackPayload;
use crate::xml::{push_cdata, push_text};

/// One news-reply card. Order is meaningful to the display surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub pic_url: String,
    pub url: String,
}

/// Variant-specific reply content.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Text {
        content: String,
    },
    Image {
        media_id: String,
    },
    Voice {
        media_id: String,
    },
    Video {
        media_id: String,
        title: String,
        description: String,
    },
    Music {
        title: String,
        description: String,
        music_url: String,
        hq_music_url: String,
        thumb_media_id: String,
    },
    News(Vec<Article>),
}

impl ReplyBody {
    /// The wire `MsgType` tag for this variant.
    pub fn msg_type(&self) -> &'static str {
        match self {
            ReplyBody::Text { .. } => "text",
            ReplyBody::Image { .. } => "image",
            ReplyBody::Voice { .. } => "voice",
            ReplyBody::Video { .. } => "video",
            ReplyBody::Music { .. } => "music",
            ReplyBody::News(_) => "news",
        }
    }
}

/// A complete outbound reply: envelope plus body.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub to_user_name: String,
    pub from_user_name: String,
    pub create_time: i64,
    pub body: ReplyBody,
}

impl Reply {
    /// Build a reply with the current timestamp.
    pub fn new(to_user: &str, from_user: &str, body: ReplyBody) -> Self {
        Self {
            to_user_name: to_user.to_string(),
            from_user_name: from_user.to_string(),
            create_time: unix_now(),
            body,
        }
    }

    /// Build a reply addressed to the sender of an inbound payload, with
    /// recipient and sender swapped.
    pub fn to_payload(payload: &CallbackPayload, body: ReplyBody) -> Self {
        let envelope = payload.envelope();
        Self::new(&envelope.from_user_name, &envelope.to_user_name, body)
    }

    /// Serialize to the passive-reply XML envelope.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(256);
        out.push_str("<xml>");
        push_cdata(&mut out, "ToUserName", &self.to_user_name);
        push_cdata(&mut out, "FromUserName", &self.from_user_name);
        push_text(&mut out, "CreateTime", self.create_time);
        push_cdata(&mut out, "MsgType", self.body.msg_type());

        match &self.body {
            ReplyBody::Text { content } => push_cdata(&mut out, "Content", content),
            ReplyBody::Image { media_id } => {
                out.push_str("<Image>");
                push_cdata(&mut out, "MediaId", media_id);
                out.push_str("</Image>");
            }
            ReplyBody::Voice { media_id } => {
                out.push_str("<Voice>");
                push_cdata(&mut out, "MediaId", media_id);
                out.push_str("</Voice>");
            }
            ReplyBody::Video {
                media_id,
                title,
                description,
            } => {
                out.push_str("<Video>");
                push_cdata(&mut out, "MediaId", media_id);
                if !title.is_empty() {
                    push_cdata(&mut out, "Title", title);
                }
                if !description.is_empty() {
                    push_cdata(&mut out, "Description", description);
                }
                out.push_str("</Video>");
            }
            ReplyBody::Music {
                title,
                description,
                music_url,
                hq_music_url,
                thumb_media_id,
            } => {
                out.push_str("<Music>");
                if !title.is_empty() {
                    push_cdata(&mut out, "Title", title);
                }
                if !description.is_empty() {
                    push_cdata(&mut out, "Description", description);
                }
                if !music_url.is_empty() {
                    push_cdata(&mut out, "MusicUrl", music_url);
                }
                if !hq_music_url.is_empty() {
                    push_cdata(&mut out, "HQMusicUrl", hq_music_url);
                }
                push_cdata(&mut out, "ThumbMediaId", thumb_media_id);
                out.push_str("</Music>");
            }
            ReplyBody::News(articles) => {
                // The explicit count must match and the card order is kept.
                push_text(&mut out, "ArticleCount", articles.len());
                out.push_str("<Articles>");
                for article in articles {
                    out.push_str("<item>");
                    push_cdata(&mut out, "Title", &article.title);
                    push_cdata(&mut out, "Description", &article.description);
                    push_cdata(&mut out, "PicUrl", &article.pic_url);
                    push_cdata(&mut out, "Url", &article.url);
                    out.push_str("</item>");
                }
                out.push_str("</Articles>");
            }
        }
        out.push_str("</xml>");
        out
    }
}

/// Convenience for collaborators that choose the reply type by name.
///
/// Only `"text"` is supported through this path; richer variants are built
/// with [`ReplyBody`] directly. Anything else is a programmer error and
/// fails with [`CallbackError::UnsupportedReply`].
pub fn create_reply(payload: &CallbackPayload, reply_type: &str, content: &str) -> Result<Reply> {
    match reply_type {
        "text" => Ok(Reply::to_payload(
            payload,
            ReplyBody::Text {
                content: content.to_string(),
            },
        )),
        other => Err(CallbackError::UnsupportedReply(other.to_string())),
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
