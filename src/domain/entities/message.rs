use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ConversationTarget;

/// Marker found in the URL of officially hosted stickers.
///
/// Images carrying it are never cached by the protocol side, so they have to
/// be fetched over HTTP instead of being looked up by file id.
pub const HOSTED_STICKER_MARKER: &str = "/club/item/";

/// Unique identifier for a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl MessageId {
    /// Returns the underlying i64 value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MessageId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One element of a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MessagePart {
    /// Image attachment, addressed by the platform's opaque file id.
    Image {
        file: String,
        url: Option<String>,
    },
    /// Quote of another message that must be fetched separately.
    Reply { id: MessageId },
    /// Plain text.
    Text { text: String },
    /// Any other segment kind (at, face, record, ...).
    Other { kind: String },
}

impl MessagePart {
    /// Creates an image part.
    #[must_use]
    pub fn image(file: impl Into<String>, url: Option<String>) -> Self {
        Self::Image {
            file: file.into(),
            url,
        }
    }

    /// Creates a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates a reply part.
    #[must_use]
    pub fn reply(id: impl Into<MessageId>) -> Self {
        Self::Reply { id: id.into() }
    }

    /// Returns true if this is an image whose URL points at a hosted sticker.
    #[must_use]
    pub fn is_hosted_sticker(&self) -> bool {
        matches!(self, Self::Image { url: Some(url), .. } if url.contains(HOSTED_STICKER_MARKER))
    }
}

/// Conversation kind a message event was received in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// One-to-one chat.
    Private,
    /// Group chat.
    Group,
}

/// Incoming chat message together with its routing information.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// Message id.
    pub message_id: MessageId,
    /// Private or group.
    pub message_type: MessageType,
    /// Sender id.
    pub user_id: i64,
    /// Group id, present for group messages.
    pub group_id: Option<i64>,
    /// Account the bot is logged in as.
    pub self_id: i64,
    /// Ordered message content.
    pub parts: Vec<MessagePart>,
    /// Raw message text as reported by the protocol side.
    pub raw_message: String,
    /// Time the message was sent.
    pub time: Option<DateTime<Utc>>,
}

impl MessageEvent {
    /// Derives where replies to this event have to go.
    ///
    /// Returns `None` for group events that lack a group id.
    #[must_use]
    pub fn target(&self) -> Option<ConversationTarget> {
        match self.message_type {
            MessageType::Private => Some(ConversationTarget::private(self.user_id)),
            MessageType::Group => self.group_id.map(ConversationTarget::group),
        }
    }

    /// Returns true if the bot account sent this message itself.
    #[must_use]
    pub const fn is_from_self(&self) -> bool {
        self.user_id == self.self_id
    }

    /// Concatenates every text part of the message.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                MessagePart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
