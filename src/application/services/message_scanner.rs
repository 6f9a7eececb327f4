//! Locates the part of a message the converter acts on.

use crate::domain::entities::MessagePart;

/// Stateless scanner over ordered message parts.
pub struct MessageScanner;

impl MessageScanner {
    /// Returns the first image or reply part, ignoring everything else.
    #[must_use]
    pub fn first_candidate(parts: &[MessagePart]) -> Option<&MessagePart> {
        parts.iter().find(|part| match part {
            MessagePart::Image { .. } | MessagePart::Reply { .. } => true,
            MessagePart::Text { .. } | MessagePart::Other { .. } => false,
        })
    }

    /// Returns the first image part.
    #[must_use]
    pub fn first_image(parts: &[MessagePart]) -> Option<&MessagePart> {
        parts
            .iter()
            .find(|part| matches!(part, MessagePart::Image { .. }))
    }
}
