//! Classifier for inbound callback XML.
//!
//! Single pass, state free: read the common envelope fields, then dispatch on
//! `MsgType` (case-folded, as the reference implementations do) or the
//! `Event` literal (case-sensitive). Unrecognized types degrade to the
//! `Unknown` variants instead of failing, so the pipeline keeps working when
//! the platform ships a new message or event type.

use crate::errors::{CallbackError, Result};
use crate::events::{self, Event};
use crate::messages::{Envelope, Message};
use crate::xml;

/// A classified inbound payload: either a content message or an event.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackPayload {
    Message(Message),
    Event(Event),
}

impl CallbackPayload {
    pub fn envelope(&self) -> &Envelope {
        match self {
            CallbackPayload::Message(m) => m.envelope(),
            CallbackPayload::Event(e) => e.envelope(),
        }
    }
}

/// Parse the decrypted (or plaintext-mode) XML envelope into a typed payload.
///
/// Fails fast with [`CallbackError::EmptyPayload`] on empty input, before any
/// XML work. Malformed input fails with [`CallbackError::Parse`] carrying the
/// original bytes for diagnostics.
pub fn parse_message(data: &[u8]) -> Result<CallbackPayload> {
    if data.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CallbackError::EmptyPayload);
    }

    let text = std::str::from_utf8(data).map_err(|e| CallbackError::Parse {
        reason: format!("invalid utf-8: {e}"),
        raw: data.to_vec(),
    })?;
    if !text.contains("<xml") {
        return Err(CallbackError::Parse {
            reason: "missing <xml> root".into(),
            raw: data.to_vec(),
        });
    }

    let envelope = Envelope {
        to_user_name: xml::text_of(text, "ToUserName").unwrap_or_default(),
        from_user_name: xml::text_of(text, "FromUserName").unwrap_or_default(),
        create_time: xml::number_of(text, "CreateTime"),
        msg_id: xml::text_of(text, "MsgId").and_then(|s| s.trim().parse().ok()),
    };

    let msg_type = xml::text_of(text, "MsgType")
        .unwrap_or_default()
        .to_ascii_lowercase();
    let event = xml::text_of(text, "Event");

    if msg_type == "event" || event.is_some() {
        return Ok(CallbackPayload::Event(parse_event(
            text,
            envelope,
            event.unwrap_or_default(),
        )));
    }
    Ok(CallbackPayload::Message(parse_content_message(
        text, envelope, msg_type,
    )))
}

fn parse_event(text: &str, envelope: Envelope, event: String) -> Event {
    // Events carry no MsgId in the envelope.
    let envelope = Envelope {
        msg_id: None,
        ..envelope
    };
    let key = || xml::text_of(text, "EventKey").unwrap_or_default();
    let ticket = || xml::text_of(text, "Ticket").unwrap_or_default();

    match event.as_str() {
        events::EVENT_SUBSCRIBE => Event::Subscribe {
            envelope,
            event_key: key(),
            ticket: ticket(),
        },
        events::EVENT_UNSUBSCRIBE => Event::Unsubscribe { envelope },
        events::EVENT_SCAN => Event::Scan {
            envelope,
            event_key: key(),
            ticket: ticket(),
        },
        events::EVENT_LOCATION => Event::Location {
            envelope,
            latitude: xml::number_of(text, "Latitude"),
            longitude: xml::number_of(text, "Longitude"),
            precision: xml::number_of(text, "Precision"),
        },
        events::EVENT_CLICK => Event::Click {
            envelope,
            event_key: key(),
        },
        events::EVENT_VIEW => Event::View {
            envelope,
            event_key: key(),
        },
        events::EVENT_MASS_SEND_JOB_FINISH => Event::MassSendJobFinish {
            envelope,
            status: xml::text_of(text, "Status").unwrap_or_default(),
            total_count: xml::number_of(text, "TotalCount"),
            filter_count: xml::number_of(text, "FilterCount"),
            sent_count: xml::number_of(text, "SentCount"),
            error_count: xml::number_of(text, "ErrorCount"),
        },
        events::EVENT_TEMPLATE_SEND_JOB_FINISH => Event::TemplateSendJobFinish {
            envelope,
            // The push uses <MsgID>; some fixtures use <MsgId>. Accept both.
            msg_id: xml::text_of(text, "MsgID")
                .or_else(|| xml::text_of(text, "MsgId"))
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or_default(),
            status: xml::text_of(text, "Status").unwrap_or_default(),
        },
        _ => Event::Unknown { envelope, event },
    }
}

fn parse_content_message(text: &str, envelope: Envelope, msg_type: String) -> Message {
    let field = |tag: &str| xml::text_of(text, tag).unwrap_or_default();

    match msg_type.as_str() {
        "text" => Message::Text {
            envelope,
            content: field("Content"),
        },
        "image" => Message::Image {
            envelope,
            pic_url: field("PicUrl"),
            media_id: field("MediaId"),
        },
        "voice" => Message::Voice {
            envelope,
            media_id: field("MediaId"),
            format: field("Format"),
            recognition: field("Recognition"),
        },
        "video" => Message::Video {
            envelope,
            media_id: field("MediaId"),
            thumb_media_id: field("ThumbMediaId"),
        },
        "shortvideo" => Message::ShortVideo {
            envelope,
            media_id: field("MediaId"),
            thumb_media_id: field("ThumbMediaId"),
        },
        "location" => Message::Location {
            envelope,
            location_x: xml::number_of(text, "Location_X"),
            location_y: xml::number_of(text, "Location_Y"),
            scale: xml::number_of(text, "Scale"),
            label: field("Label"),
        },
        "link" => Message::Link {
            envelope,
            title: field("Title"),
            description: field("Description"),
            url: field("Url"),
        },
        "miniprogrampage" => Message::MiniProgramPage {
            envelope,
            app_id: field("AppId"),
            title: field("Title"),
            page_path: field("PagePath"),
            thumb_url: field("ThumbUrl"),
            thumb_media_id: field("ThumbMediaId"),
        },
        _ => Message::Unknown { envelope, msg_type },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> CallbackPayload {
        parse_message(xml.as_bytes()).unwrap()
    }

    #[test]
    fn empty_input_fails_fast() {
        for data in [&b""[..], b"   \n\t "] {
            match parse_message(data) {
                Err(CallbackError::EmptyPayload) => {}
                other => panic!("expected EmptyPayload, got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_input_keeps_raw_bytes() {
        match parse_message(b"not xml at all") {
            Err(CallbackError::Parse { raw, .. }) => assert_eq!(raw, b"not xml at all"),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn text_message() {
        let payload = parse(
            "<xml><ToUserName><![CDATA[toUser]]></ToUserName>\
             <FromUserName><![CDATA[fromUser]]></FromUserName>\
             <CreateTime>1348831860</CreateTime>\
             <MsgType><![CDATA[text]]></MsgType>\
             <Content><![CDATA[hello]]></Content>\
             <MsgId>1234567890123456</MsgId></xml>",
        );
        match payload {
            CallbackPayload::Message(Message::Text { envelope, content }) => {
                assert_eq!(content, "hello");
                assert_eq!(envelope.to_user_name, "toUser");
                assert_eq!(envelope.from_user_name, "fromUser");
                assert_eq!(envelope.create_time, 1348831860);
                assert_eq!(envelope.msg_id, Some(1234567890123456));
            }
            other => panic!("expected text message, got {other:?}"),
        }
    }

    #[test]
    fn subscribe_event() {
        let payload = parse(
            "<xml><ToUserName>toUser</ToUserName><FromUserName>fromUser</FromUserName>\
             <CreateTime>1234567890</CreateTime><MsgType>event</MsgType>\
             <Event>subscribe</Event><EventKey>k</EventKey><Ticket>TICKET</Ticket></xml>",
        );
        match payload {
            CallbackPayload::Event(Event::Subscribe {
                event_key, ticket, ..
            }) => {
                assert_eq!(event_key, "k");
                assert_eq!(ticket, "TICKET");
            }
            other => panic!("expected subscribe event, got {other:?}"),
        }
    }

    #[test]
    fn event_names_are_case_sensitive() {
        // Lowercase "click" is not the protocol literal CLICK.
        let payload = parse(
            "<xml><MsgType>event</MsgType><Event>click</Event><EventKey>K</EventKey></xml>",
        );
        assert!(matches!(
            payload,
            CallbackPayload::Event(Event::Unknown { ref event, .. }) if event == "click"
        ));

        let payload =
            parse("<xml><MsgType>event</MsgType><Event>CLICK</Event><EventKey>K</EventKey></xml>");
        assert!(matches!(
            payload,
            CallbackPayload::Event(Event::Click { ref event_key, .. }) if event_key == "K"
        ));
    }

    #[test]
    fn location_event_parses_floats() {
        let payload = parse(
            "<xml><MsgType>event</MsgType><Event>LOCATION</Event>\
             <Latitude>23.137466</Latitude><Longitude>113.352425</Longitude>\
             <Precision>119.385040</Precision></xml>",
        );
        match payload {
            CallbackPayload::Event(Event::Location {
                latitude,
                longitude,
                precision,
                ..
            }) => {
                assert!((latitude - 23.137466).abs() < 1e-9);
                assert!((longitude - 113.352425).abs() < 1e-9);
                assert!((precision - 119.385040).abs() < 1e-9);
            }
            other => panic!("expected location event, got {other:?}"),
        }
    }

    #[test]
    fn mass_send_job_finish_counts() {
        let payload = parse(
            "<xml><MsgType>event</MsgType><Event>MASSSENDJOBFINISH</Event>\
             <Status>send success</Status><TotalCount>200</TotalCount>\
             <FilterCount>200</FilterCount><SentCount>198</SentCount>\
             <ErrorCount>2</ErrorCount></xml>",
        );
        match payload {
            CallbackPayload::Event(Event::MassSendJobFinish {
                status,
                total_count,
                sent_count,
                error_count,
                ..
            }) => {
                assert_eq!(status, "send success");
                assert_eq!(total_count, 200);
                assert_eq!(sent_count, 198);
                assert_eq!(error_count, 2);
            }
            other => panic!("expected mass send event, got {other:?}"),
        }
    }

    #[test]
    fn template_send_job_finish_accepts_both_msgid_spellings() {
        for tag in ["MsgID", "MsgId"] {
            let payload = parse(&format!(
                "<xml><MsgType>event</MsgType><Event>TEMPLATESENDJOBFINISH</Event>\
                 <{tag}>200163836</{tag}><Status>success</Status></xml>"
            ));
            match payload {
                CallbackPayload::Event(Event::TemplateSendJobFinish { msg_id, status, .. }) => {
                    assert_eq!(msg_id, 200163836, "tag {tag}");
                    assert_eq!(status, "success");
                }
                other => panic!("expected template event, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_msg_type_degrades() {
        let payload = parse(
            "<xml><ToUserName>toUser</ToUserName><FromUserName>fromUser</FromUserName>\
             <CreateTime>1234567890</CreateTime><MsgType>bogus</MsgType>\
             <MsgId>42</MsgId></xml>",
        );
        match payload {
            CallbackPayload::Message(Message::Unknown { envelope, msg_type }) => {
                assert_eq!(msg_type, "bogus");
                assert_eq!(envelope.msg_id, Some(42));
            }
            other => panic!("expected unknown message, got {other:?}"),
        }
    }

    #[test]
    fn msg_type_is_case_folded() {
        let payload = parse("<xml><MsgType>TEXT</MsgType><Content>hi</Content></xml>");
        assert!(matches!(
            payload,
            CallbackPayload::Message(Message::Text { ref content, .. }) if content == "hi"
        ));
    }

    #[test]
    fn miniprogrampage_message() {
        let payload = parse(
            "<xml><MsgType>miniprogrampage</MsgType><AppId>wxapp</AppId>\
             <Title><![CDATA[t]]></Title><PagePath>pages/index</PagePath>\
             <ThumbUrl>http://t</ThumbUrl><ThumbMediaId>tm</ThumbMediaId></xml>",
        );
        match payload {
            CallbackPayload::Message(Message::MiniProgramPage {
                app_id, page_path, ..
            }) => {
                assert_eq!(app_id, "wxapp");
                assert_eq!(page_path, "pages/index");
            }
            other => panic!("expected mini program page message, got {other:?}"),
        }
    }
}
