//! Bot protocol port definition.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::entities::{MessageId, MessagePart, OutboundSegment};
use crate::domain::errors::BotApiError;

/// Port for the actions the converter needs from the bot endpoint.
#[async_trait]
pub trait BotApiPort: Send + Sync {
    /// Resolves an image file id to the path of its cached copy.
    async fn get_image(&self, file_id: &str) -> Result<PathBuf, BotApiError>;

    /// Fetches the content of a previously sent message.
    async fn get_msg(&self, message_id: MessageId) -> Result<Vec<MessagePart>, BotApiError>;

    /// Sends a direct message.
    ///
    /// The new message id is returned when the endpoint reports one.
    async fn send_private_msg(
        &self,
        user_id: i64,
        message: Vec<OutboundSegment>,
    ) -> Result<Option<MessageId>, BotApiError>;

    /// Sends a group message.
    async fn send_group_msg(
        &self,
        group_id: i64,
        message: Vec<OutboundSegment>,
    ) -> Result<Option<MessageId>, BotApiError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::entities::ConversationTarget;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Call observed by [`RecordingBotApi`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum BotApiCall {
        GetImage(String),
        GetMsg(MessageId),
        Send(ConversationTarget, Vec<OutboundSegment>),
    }

    /// In-memory bot endpoint that records every call.
    #[derive(Default)]
    pub struct RecordingBotApi {
        images: Mutex<HashMap<String, PathBuf>>,
        messages: Mutex<HashMap<MessageId, Vec<MessagePart>>>,
        calls: Mutex<Vec<BotApiCall>>,
        fail_sends: bool,
    }

    impl RecordingBotApi {
        /// Creates an empty mock.
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a mock whose send actions always fail.
        pub fn failing_sends() -> Self {
            Self {
                fail_sends: true,
                ..Self::default()
            }
        }

        /// Registers a cached image.
        pub fn with_image(self, file_id: &str, path: impl Into<PathBuf>) -> Self {
            self.images.lock().insert(file_id.to_string(), path.into());
            self
        }

        /// Registers a message retrievable through `get_msg`.
        pub fn with_message(self, id: i64, parts: Vec<MessagePart>) -> Self {
            self.messages.lock().insert(MessageId(id), parts);
            self
        }

        /// Returns all calls in order.
        pub fn calls(&self) -> Vec<BotApiCall> {
            self.calls.lock().clone()
        }

        /// Returns only the send calls.
        pub fn sent(&self) -> Vec<(ConversationTarget, Vec<OutboundSegment>)> {
            self.calls
                .lock()
                .iter()
                .filter_map(|call| match call {
                    BotApiCall::Send(target, message) => Some((*target, message.clone())),
                    _ => None,
                })
                .collect()
        }

        fn record_send(
            &self,
            target: ConversationTarget,
            message: Vec<OutboundSegment>,
        ) -> Result<Option<MessageId>, BotApiError> {
            self.calls.lock().push(BotApiCall::Send(target, message));
            if self.fail_sends {
                return Err(BotApiError::action_failed("send_msg", 100, "mock failure"));
            }
            Ok(Some(MessageId(1)))
        }
    }

    #[async_trait]
    impl BotApiPort for RecordingBotApi {
        async fn get_image(&self, file_id: &str) -> Result<PathBuf, BotApiError> {
            self.calls
                .lock()
                .push(BotApiCall::GetImage(file_id.to_string()));
            self.images
                .lock()
                .get(file_id)
                .cloned()
                .ok_or_else(|| BotApiError::action_failed("get_image", 1404, "image not found"))
        }

        async fn get_msg(&self, message_id: MessageId) -> Result<Vec<MessagePart>, BotApiError> {
            self.calls.lock().push(BotApiCall::GetMsg(message_id));
            self.messages
                .lock()
                .get(&message_id)
                .cloned()
                .ok_or_else(|| BotApiError::action_failed("get_msg", 1404, "message not found"))
        }

        async fn send_private_msg(
            &self,
            user_id: i64,
            message: Vec<OutboundSegment>,
        ) -> Result<Option<MessageId>, BotApiError> {
            self.record_send(ConversationTarget::private(user_id), message)
        }

        async fn send_group_msg(
            &self,
            group_id: i64,
            message: Vec<OutboundSegment>,
        ) -> Result<Option<MessageId>, BotApiError> {
            self.record_send(ConversationTarget::group(group_id), message)
        }
    }
}
