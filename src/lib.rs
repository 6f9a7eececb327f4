//! qface-relay - A OneBot v11 bot that turns QQ stickers into image files.
//!
//! Users send `/转换` together with an image, or in reply to one, and the bot
//! sends the same picture back as a file attachment so it can be saved
//! outside the chat client.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer dispatching chat commands.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "qface-relay";
