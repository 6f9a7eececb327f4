//! Application layer with use cases, services, and DTOs.

/// Data transfer objects.
pub mod dto;
/// Stateless helpers used by the use cases.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{ConvertOutcome, ConvertRequest};
pub use services::CommandMatcher;
pub use use_cases::ConvertStickerUseCase;
