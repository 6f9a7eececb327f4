use thiserror::Error;

use crate::domain::errors::BotApiError;

pub type OneBotResult<T> = Result<T, OneBotError>;

#[derive(Debug, Error)]
pub enum OneBotError {
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("connection closed with code {code}: {reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("websocket error: {message}")]
    WebSocket { message: String },

    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("invalid endpoint: {message}")]
    InvalidEndpoint { message: String },

    #[error("action {action} failed with retcode {retcode}: {message}")]
    ActionFailed {
        action: String,
        retcode: i64,
        message: String,
    },

    #[error("serialization error: {message}")]
    SerializationError { message: String },

    #[error("protocol error: {message}")]
    ProtocolError { message: String },

    #[error("timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("channel closed")]
    ChannelClosed,

    #[error("not connected to OneBot endpoint")]
    NotConnected,

    #[error("client already running")]
    AlreadyRunning,
}

impl OneBotError {
    #[must_use]
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn websocket(message: impl Into<String>) -> Self {
        Self::WebSocket {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_endpoint(message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn action_failed(action: impl Into<String>, retcode: i64, message: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            retcode,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    #[must_use]
    pub const fn should_reconnect(&self) -> bool {
        !matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::InvalidEndpoint { .. } | Self::AlreadyRunning
        )
    }
}

impl From<serde_json::Error> for OneBotError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string())
    }
}

impl From<OneBotError> for BotApiError {
    fn from(error: OneBotError) -> Self {
        match error {
            OneBotError::ActionFailed {
                action,
                retcode,
                message,
            } => Self::ActionFailed {
                action,
                retcode,
                message,
            },
            OneBotError::Timeout { operation } => Self::Timeout { action: operation },
            OneBotError::NotConnected => Self::NotConnected,
            other => Self::transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_do_not_reconnect() {
        assert!(!OneBotError::authentication_failed("401").should_reconnect());
        assert!(!OneBotError::invalid_endpoint("bad url").should_reconnect());
        assert!(OneBotError::websocket("reset").should_reconnect());
        assert!(
            OneBotError::ConnectionClosed {
                code: 1006,
                reason: "abnormal".to_string()
            }
            .should_reconnect()
        );
    }

    #[test]
    fn test_conversion_to_bot_api_error() {
        let failed: BotApiError = OneBotError::action_failed("get_image", 1404, "no such file").into();
        assert!(matches!(
            failed,
            BotApiError::ActionFailed { retcode: 1404, .. }
        ));

        let timeout: BotApiError = OneBotError::timeout("get_msg").into();
        assert!(matches!(timeout, BotApiError::Timeout { ref action } if action == "get_msg"));

        let closed: BotApiError = OneBotError::ChannelClosed.into();
        assert!(closed.is_connection_error());
    }
}
