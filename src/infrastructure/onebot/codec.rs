use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};

use super::error::{OneBotError, OneBotResult};
use super::payloads::{ActionResponse, EventPayload, MessageContent, MessagePayload, SegmentPayload};
use crate::domain::entities::{MessageEvent, MessageId, MessagePart, MessageType};

static CQ_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[CQ:([A-Za-z0-9_.\-]+)((?:,[^,\]]*)*)\]").expect("Invalid CQ code regex")
});

/// A decoded frame received from the OneBot endpoint.
#[derive(Debug, Clone)]
pub enum InboundFrame {
    Event(EventPayload),
    Response(ActionResponse),
}

pub struct EventParser;

impl EventParser {
    /// Classifies a text frame as an event push or an action response.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is not JSON or matches neither shape.
    pub fn parse_frame(text: &str) -> OneBotResult<InboundFrame> {
        let value: Value = serde_json::from_str(text)?;

        if value.get("post_type").is_some() {
            return Ok(InboundFrame::Event(serde_json::from_value(value)?));
        }

        if value.get("status").is_some() {
            return Ok(InboundFrame::Response(serde_json::from_value(value)?));
        }

        Err(OneBotError::protocol("frame is neither an event nor a response"))
    }

    /// Converts a message push into a domain event.
    ///
    /// Returns `None` for conversation kinds other than private and group.
    #[must_use]
    pub fn message_event(payload: MessagePayload) -> Option<MessageEvent> {
        let message_type = match payload.message_type.as_str() {
            "private" => MessageType::Private,
            "group" => MessageType::Group,
            _ => return None,
        };

        let time = (payload.time > 0)
            .then(|| DateTime::<Utc>::from_timestamp(payload.time, 0))
            .flatten();

        Some(MessageEvent {
            message_id: MessageId(payload.message_id),
            message_type,
            user_id: payload.user_id,
            group_id: payload.group_id,
            self_id: payload.self_id,
            parts: SegmentCodec::decode_content(&payload.message),
            raw_message: payload.raw_message,
            time,
        })
    }
}

pub struct SegmentCodec;

impl SegmentCodec {
    #[must_use]
    pub fn decode_content(content: &MessageContent) -> Vec<MessagePart> {
        match content {
            MessageContent::Segments(segments) => {
                segments.iter().map(Self::decode_segment).collect()
            }
            MessageContent::CqString(text) => Self::parse_cq(text)
                .iter()
                .map(Self::decode_segment)
                .collect(),
        }
    }

    #[must_use]
    pub fn decode_segment(segment: &SegmentPayload) -> MessagePart {
        match segment.kind.as_str() {
            "image" => match segment.data_str("file") {
                Some(file) => MessagePart::Image {
                    file,
                    url: segment.data_str("url").filter(|u| !u.is_empty()),
                },
                None => MessagePart::Other {
                    kind: segment.kind.clone(),
                },
            },
            "reply" => match segment.data_str("id").and_then(|id| id.trim().parse().ok()) {
                Some(id) => MessagePart::Reply { id: MessageId(id) },
                None => MessagePart::Other {
                    kind: segment.kind.clone(),
                },
            },
            "text" => MessagePart::Text {
                text: segment.data_str("text").unwrap_or_default(),
            },
            other => MessagePart::Other {
                kind: other.to_string(),
            },
        }
    }

    /// Splits a CQ-code message string into segments.
    #[must_use]
    pub fn parse_cq(message: &str) -> Vec<SegmentPayload> {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for captures in CQ_CODE_REGEX.captures_iter(message) {
            let Some(whole) = captures.get(0) else {
                continue;
            };

            Self::push_text(&mut segments, &message[cursor..whole.start()]);
            cursor = whole.end();

            let kind = captures.get(1).map_or("", |m| m.as_str()).to_string();
            let mut data = Map::new();
            if let Some(params) = captures.get(2) {
                for param in params.as_str().split(',').filter(|p| !p.is_empty()) {
                    if let Some((key, value)) = param.split_once('=') {
                        data.insert(key.to_string(), Value::String(unescape(value)));
                    }
                }
            }

            segments.push(SegmentPayload { kind, data });
        }

        Self::push_text(&mut segments, &message[cursor..]);
        segments
    }

    fn push_text(segments: &mut Vec<SegmentPayload>, text: &str) {
        if text.is_empty() {
            return;
        }

        let mut data = Map::new();
        data.insert("text".to_string(), Value::String(unescape(text)));
        segments.push(SegmentPayload {
            kind: "text".to_string(),
            data,
        });
    }
}

fn unescape(text: &str) -> String {
    text.replace("&#44;", ",")
        .replace("&#91;", "[")
        .replace("&#93;", "]")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_frame_detects_response() {
        let frame = EventParser::parse_frame(
            r#"{"status":"ok","retcode":0,"data":{"file":"/tmp/a.png"},"echo":"e1"}"#,
        )
        .unwrap();

        let InboundFrame::Response(response) = frame else {
            panic!("expected response");
        };
        assert!(response.is_ok());
        assert_eq!(response.echo_str(), Some("e1"));
    }

    #[test]
    fn test_parse_frame_detects_heartbeat() {
        let frame = EventParser::parse_frame(
            r#"{"post_type":"meta_event","meta_event_type":"heartbeat","self_id":1,"time":1}"#,
        )
        .unwrap();

        assert!(matches!(
            frame,
            InboundFrame::Event(EventPayload::MetaEvent(ref meta)) if meta.meta_event_type == "heartbeat"
        ));
    }

    #[test]
    fn test_parse_frame_rejects_garbage() {
        assert!(EventParser::parse_frame("not json").is_err());
        assert!(EventParser::parse_frame(r#"{"hello":"world"}"#).is_err());
    }

    #[test]
    fn test_message_event_from_segments() {
        let frame = EventParser::parse_frame(
            &json!({
                "post_type": "message",
                "message_type": "private",
                "sub_type": "friend",
                "message_id": 101,
                "user_id": 10001,
                "self_id": 20002,
                "time": 1_700_000_000,
                "message": [
                    {"type": "image", "data": {"file": "abc.image", "url": "https://gxh.vip.qq.com/club/item/parcel/1/raw300.gif"}},
                    {"type": "text", "data": {"text": "/转换"}}
                ],
                "raw_message": "[CQ:image,file=abc.image]/转换"
            })
            .to_string(),
        )
        .unwrap();

        let InboundFrame::Event(EventPayload::Message(payload)) = frame else {
            panic!("expected message event");
        };
        let event = EventParser::message_event(payload).unwrap();

        assert_eq!(event.message_type, MessageType::Private);
        assert_eq!(event.message_id, MessageId(101));
        assert!(event.parts[0].is_hosted_sticker());
        assert_eq!(event.plain_text(), "/转换");
        assert!(event.time.is_some());
    }

    #[test]
    fn test_unsupported_message_type_is_dropped() {
        let payload: MessagePayload = serde_json::from_value(json!({
            "message_type": "guild",
            "message_id": 1,
            "user_id": 2,
            "self_id": 3
        }))
        .unwrap();

        assert!(EventParser::message_event(payload).is_none());
    }

    #[test]
    fn test_parse_cq_string() {
        let segments = SegmentCodec::parse_cq("[CQ:reply,id=-12]看看[CQ:image,file=a.png,url=https://x/y?a=1&amp;b=2] /转换");

        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].kind, "reply");
        assert_eq!(segments[0].data_str("id").as_deref(), Some("-12"));
        assert_eq!(segments[1].data_str("text").as_deref(), Some("看看"));
        assert_eq!(
            segments[2].data_str("url").as_deref(),
            Some("https://x/y?a=1&b=2")
        );
        assert_eq!(segments[3].data_str("text").as_deref(), Some(" /转换"));
    }

    #[test]
    fn test_parse_cq_unescapes_text() {
        let segments = SegmentCodec::parse_cq("&#91;not a code&#93; &amp;#44;");
        assert_eq!(segments.len(), 1);
        assert_eq!(
            segments[0].data_str("text").as_deref(),
            Some("[not a code] &#44;")
        );
    }

    #[test]
    fn test_decode_cq_content() {
        let parts = SegmentCodec::decode_content(&MessageContent::CqString(
            "[CQ:reply,id=7][CQ:at,qq=1]/转换".to_string(),
        ));

        assert_eq!(
            parts,
            vec![
                MessagePart::reply(7),
                MessagePart::Other {
                    kind: "at".to_string()
                },
                MessagePart::text("/转换"),
            ]
        );
    }

    #[test]
    fn test_malformed_segments_become_other() {
        let image_without_file: SegmentPayload =
            serde_json::from_value(json!({"type": "image", "data": {"url": "https://x"}})).unwrap();
        let reply_with_bad_id: SegmentPayload =
            serde_json::from_value(json!({"type": "reply", "data": {"id": "abc"}})).unwrap();

        assert!(matches!(
            SegmentCodec::decode_segment(&image_without_file),
            MessagePart::Other { ref kind } if kind == "image"
        ));
        assert!(matches!(
            SegmentCodec::decode_segment(&reply_with_bad_id),
            MessagePart::Other { ref kind } if kind == "reply"
        ));
    }

    #[test]
    fn test_empty_image_url_is_treated_as_absent() {
        let segment: SegmentPayload =
            serde_json::from_value(json!({"type": "image", "data": {"file": "a.jpg", "url": ""}}))
                .unwrap();

        assert_eq!(
            SegmentCodec::decode_segment(&segment),
            MessagePart::image("a.jpg", None)
        );
    }
}
