//! Errors raised by calls into the bot protocol endpoint.

use thiserror::Error;

/// Bot API call error variants.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum BotApiError {
    #[error("action {action} failed with retcode {retcode}: {message}")]
    ActionFailed {
        action: String,
        retcode: i64,
        message: String,
    },

    #[error("action {action} timed out")]
    Timeout { action: String },

    #[error("not connected to the bot endpoint")]
    NotConnected,

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("invalid response to {action}: {message}")]
    InvalidResponse { action: String, message: String },
}

impl BotApiError {
    /// Creates action failed error.
    #[must_use]
    pub fn action_failed(action: impl Into<String>, retcode: i64, message: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            retcode,
            message: message.into(),
        }
    }

    /// Creates invalid response error.
    #[must_use]
    pub fn invalid_response(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Creates transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns whether the endpoint answered at all.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::NotConnected | Self::Transport { .. } | Self::Timeout { .. }
        )
    }
}
