//! Event handling.

use crate::application::dto::ConvertRequest;

/// Result of handling one protocol event.
#[derive(Debug, Clone)]
pub enum EventResult {
    /// Nothing to do.
    Continue,
    /// A conversion command was received.
    Convert(ConvertRequest),
    /// The event stream cannot recover; stop the bot.
    Exit {
        /// Why the bot stops.
        reason: String,
    },
}

impl EventResult {
    /// Returns true if the bot should stop.
    #[must_use]
    pub const fn is_exit(&self) -> bool {
        matches!(self, Self::Exit { .. })
    }
}
