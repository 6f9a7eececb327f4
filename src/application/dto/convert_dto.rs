//! Sticker conversion DTOs.

use crate::domain::entities::{ConversationTarget, MessageEvent, MessageId, MessagePart};

/// Conversion request built from a triggering command message.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    /// Id of the triggering message.
    pub message_id: MessageId,
    /// Conversation the result goes back to.
    pub target: ConversationTarget,
    /// Ordered parts of the triggering message.
    pub parts: Vec<MessagePart>,
}

impl ConvertRequest {
    /// Creates new conversion request.
    #[must_use]
    pub const fn new(
        message_id: MessageId,
        target: ConversationTarget,
        parts: Vec<MessagePart>,
    ) -> Self {
        Self {
            message_id,
            target,
            parts,
        }
    }

    /// Builds a request from a message event.
    ///
    /// Returns `None` when the event has no routable conversation.
    #[must_use]
    pub fn from_event(event: MessageEvent) -> Option<Self> {
        let target = event.target()?;
        Some(Self::new(event.message_id, target, event.parts))
    }
}

/// Result of a handled conversion command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// Nothing convertible was found; no message was sent.
    NothingToConvert,
    /// The image was sent back as a file.
    Sent {
        /// Display filename of the attachment.
        filename: String,
    },
    /// The conversion failed and the failure text was sent instead.
    FailureReported {
        /// Text that was sent.
        reply: &'static str,
    },
}
