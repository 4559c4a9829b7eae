//! Typed inbound content messages.
//!
//! Every variant carries the common [`Envelope`] by composition; dispatch is a
//! match on the enum tag rather than downcasts on a shared base type. An
//! unrecognized `MsgType` degrades to [`Message::Unknown`] so new platform
//! message types do not break the pipeline.

/// Fields the transport guarantees on every inbound message and event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    /// Recipient account (our side).
    pub to_user_name: String,
    /// Sender (the platform user, or the platform itself for events).
    pub from_user_name: String,
    /// Unix timestamp assigned by the platform.
    pub create_time: i64,
    /// Message id; absent on events and some pushes.
    pub msg_id: Option<i64>,
}

/// Inbound content message, one variant per `MsgType`.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text {
        envelope: Envelope,
        content: String,
    },
    Image {
        envelope: Envelope,
        pic_url: String,
        media_id: String,
    },
    Voice {
        envelope: Envelope,
        media_id: String,
        format: String,
        /// Speech-to-text result; only present when the account has the
        /// recognition capability enabled.
        recognition: String,
    },
    Video {
        envelope: Envelope,
        media_id: String,
        thumb_media_id: String,
    },
    ShortVideo {
        envelope: Envelope,
        media_id: String,
        thumb_media_id: String,
    },
    Location {
        envelope: Envelope,
        location_x: f64,
        location_y: f64,
        scale: i32,
        label: String,
    },
    Link {
        envelope: Envelope,
        title: String,
        description: String,
        url: String,
    },
    MiniProgramPage {
        envelope: Envelope,
        app_id: String,
        title: String,
        page_path: String,
        thumb_url: String,
        thumb_media_id: String,
    },
    /// Forward-compatibility fallback carrying the raw `MsgType`.
    Unknown {
        envelope: Envelope,
        msg_type: String,
    },
}

impl Message {
    pub fn envelope(&self) -> &Envelope {
        match self {
            Message::Text { envelope, .. }
            | Message::Image { envelope, .. }
            | Message::Voice { envelope, .. }
            | Message::Video { envelope, .. }
            | Message::ShortVideo { envelope, .. }
            | Message::Location { envelope, .. }
            | Message::Link { envelope, .. }
            | Message::MiniProgramPage { envelope, .. }
            | Message::Unknown { envelope, .. } => envelope,
        }
    }

    /// The wire `MsgType` tag for this variant.
    pub fn msg_type(&self) -> &str {
        match self {
            Message::Text { .. } => "text",
            Message::Image { .. } => "image",
            Message::Voice { .. } => "voice",
            Message::Video { .. } => "video",
            Message::ShortVideo { .. } => "shortvideo",
            Message::Location { .. } => "location",
            Message::Link { .. } => "link",
            Message::MiniProgramPage { .. } => "miniprogrampage",
            Message::Unknown { msg_type, .. } => msg_type,
        }
    }
}
