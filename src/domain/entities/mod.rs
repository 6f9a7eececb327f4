//! Domain entity definitions.

mod conversation;
mod message;
mod outbound;
mod resolved_image;
mod token;

pub use conversation::ConversationTarget;
pub use message::{
    HOSTED_STICKER_MARKER, MessageEvent, MessageId, MessagePart, MessageType,
};
pub use outbound::OutboundSegment;
pub use resolved_image::{DISPLAY_STEM, ImageExtension, ImageOrigin, ResolvedImage};
pub use token::AccessToken;
