//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;

pub use entities::{ConversationTarget, MessageEvent, MessagePart, ResolvedImage};
pub use errors::{BotApiError, ConvertError, FetchError};
pub use ports::{BotApiPort, ImageFetchPort};
