//! Presentation layer turning protocol events into use case calls.

/// Chat command dispatch.
pub mod bot;
/// Event handling.
pub mod events;

pub use bot::StickerBot;
pub use events::EventResult;
