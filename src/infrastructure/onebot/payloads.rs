use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::constants::STATUS_OK;
use crate::domain::serde_utils::lenient_i64;

#[derive(Debug, Clone, Serialize)]
pub struct ActionRequest {
    pub action: String,
    pub params: Value,
    pub echo: String,
}

impl ActionRequest {
    #[must_use]
    pub fn new(action: impl Into<String>, params: Value) -> Self {
        Self {
            action: action.into(),
            params,
            echo: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    #[serde(default)]
    pub retcode: i64,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub echo: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub wording: Option<String>,
}

impl ActionResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK && self.retcode == 0
    }

    #[must_use]
    pub fn echo_str(&self) -> Option<&str> {
        self.echo.as_ref().and_then(Value::as_str)
    }

    #[must_use]
    pub fn error_message(&self) -> String {
        self.wording
            .as_deref()
            .or(self.message.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.status)
            .to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "post_type", rename_all = "snake_case")]
pub enum EventPayload {
    Message(MessagePayload),
    MessageSent(MessagePayload),
    MetaEvent(MetaEventPayload),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    #[serde(with = "lenient_i64")]
    pub message_id: i64,
    pub message_type: String,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(with = "lenient_i64")]
    pub user_id: i64,
    #[serde(default, with = "lenient_i64::option")]
    pub group_id: Option<i64>,
    #[serde(with = "lenient_i64")]
    pub self_id: i64,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub message: MessageContent,
    #[serde(default)]
    pub raw_message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaEventPayload {
    pub meta_event_type: String,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(default, with = "lenient_i64::option")]
    pub self_id: Option<i64>,
}

/// Message body, either as a segment array or as a CQ-code string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Segments(Vec<SegmentPayload>),
    CqString(String),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Segments(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SegmentPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl SegmentPayload {
    /// Returns a data field as a string, accepting numbers as well.
    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetImageData {
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetMsgData {
    #[serde(default)]
    pub message: MessageContent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMsgData {
    #[serde(default, with = "lenient_i64::option")]
    pub message_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_request_shape() {
        let request = ActionRequest::new("get_msg", json!({"message_id": 5}));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["action"], "get_msg");
        assert_eq!(value["params"]["message_id"], 5);
        assert_eq!(value["echo"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn test_echoes_are_unique() {
        let a = ActionRequest::new("get_msg", Value::Null);
        let b = ActionRequest::new("get_msg", Value::Null);
        assert_ne!(a.echo, b.echo);
    }

    #[test]
    fn test_failed_response() {
        let response: ActionResponse = serde_json::from_value(json!({
            "status": "failed",
            "retcode": 1200,
            "data": null,
            "message": "",
            "wording": "消息不存在",
            "echo": "abc"
        }))
        .unwrap();

        assert!(!response.is_ok());
        assert_eq!(response.echo_str(), Some("abc"));
        assert_eq!(response.error_message(), "消息不存在");
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        let response: ActionResponse =
            serde_json::from_value(json!({"status": "failed", "retcode": 100})).unwrap();
        assert_eq!(response.error_message(), "failed");
    }

    #[test]
    fn test_unknown_post_type() {
        let event: EventPayload =
            serde_json::from_value(json!({"post_type": "notice", "notice_type": "group_upload"}))
                .unwrap();
        assert!(matches!(event, EventPayload::Other));
    }

    #[test]
    fn test_message_event_with_string_ids() {
        let event: EventPayload = serde_json::from_value(json!({
            "post_type": "message",
            "message_type": "group",
            "message_id": "-2147483000",
            "user_id": "10001",
            "group_id": 555,
            "self_id": 20002,
            "time": 1_700_000_000,
            "message": "[CQ:reply,id=1]/转换",
            "raw_message": "[CQ:reply,id=1]/转换"
        }))
        .unwrap();

        let EventPayload::Message(payload) = event else {
            panic!("expected message event");
        };
        assert_eq!(payload.message_id, -2_147_483_000);
        assert_eq!(payload.user_id, 10001);
        assert_eq!(payload.group_id, Some(555));
        assert!(matches!(payload.message, MessageContent::CqString(_)));
    }

    #[test]
    fn test_segment_data_str_accepts_numbers() {
        let segment: SegmentPayload =
            serde_json::from_value(json!({"type": "reply", "data": {"id": 42}})).unwrap();
        assert_eq!(segment.data_str("id"), Some("42".to_string()));
        assert_eq!(segment.data_str("missing"), None);
    }
}
