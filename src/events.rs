//! Typed inbound events.
//!
//! Event names on the wire are matched as literals. The platform is
//! inconsistent about case (`subscribe` vs `SCAN`) and the literals must stay
//! exactly as published to remain bit-compatible; do not case-fold them.

use crate::messages::Envelope;

/// Wire literals for the dispatched event types.
pub const EVENT_SUBSCRIBE: &str = "subscribe";
pub const EVENT_UNSUBSCRIBE: &str = "unsubscribe";
pub const EVENT_SCAN: &str = "SCAN";
pub const EVENT_LOCATION: &str = "LOCATION";
pub const EVENT_CLICK: &str = "CLICK";
pub const EVENT_VIEW: &str = "VIEW";
pub const EVENT_MASS_SEND_JOB_FINISH: &str = "MASSSENDJOBFINISH";
pub const EVENT_TEMPLATE_SEND_JOB_FINISH: &str = "TEMPLATESENDJOBFINISH";

/// Inbound event, one variant per `Event` literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// User followed the account; carries a scene key/ticket when the follow
    /// came from a parameterized QR code.
    Subscribe {
        envelope: Envelope,
        event_key: String,
        ticket: String,
    },
    Unsubscribe {
        envelope: Envelope,
    },
    /// Already-subscribed user scanned a parameterized QR code.
    Scan {
        envelope: Envelope,
        event_key: String,
        ticket: String,
    },
    /// Periodic location report.
    Location {
        envelope: Envelope,
        latitude: f64,
        longitude: f64,
        precision: f64,
    },
    Click {
        envelope: Envelope,
        event_key: String,
    },
    View {
        envelope: Envelope,
        event_key: String,
    },
    MassSendJobFinish {
        envelope: Envelope,
        status: String,
        total_count: i64,
        filter_count: i64,
        sent_count: i64,
        error_count: i64,
    },
    TemplateSendJobFinish {
        envelope: Envelope,
        msg_id: i64,
        status: String,
    },
    /// Forward-compatibility fallback carrying the raw event name.
    Unknown {
        envelope: Envelope,
        event: String,
    },
}

impl Event {
    pub fn envelope(&self) -> &Envelope {
        match self {
            Event::Subscribe { envelope, .. }
            | Event::Unsubscribe { envelope }
            | Event::Scan { envelope, .. }
            | Event::Location { envelope, .. }
            | Event::Click { envelope, .. }
            | Event::View { envelope, .. }
            | Event::MassSendJobFinish { envelope, .. }
            | Event::TemplateSendJobFinish { envelope, .. }
            | Event::Unknown { envelope, .. } => envelope,
        }
    }

    /// The wire `Event` literal for this variant.
    pub fn event(&self) -> &str {
        match self {
            Event::Subscribe { .. } => EVENT_SUBSCRIBE,
            Event::Unsubscribe { .. } => EVENT_UNSUBSCRIBE,
            Event::Scan { .. } => EVENT_SCAN,
            Event::Location { .. } => EVENT_LOCATION,
            Event::Click { .. } => EVENT_CLICK,
            Event::View { .. } => EVENT_VIEW,
            Event::MassSendJobFinish { .. } => EVENT_MASS_SEND_JOB_FINISH,
            Event::TemplateSendJobFinish { .. } => EVENT_TEMPLATE_SEND_JOB_FINISH,
            Event::Unknown { event, .. } => event,
        }
    }
}
