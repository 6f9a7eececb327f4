//! Outbound message segments.

use serde::{Deserialize, Serialize};

use super::ResolvedImage;

/// One element of a message the bot sends.
///
/// Serializes to the `{"type": ..., "data": {...}}` segment shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum OutboundSegment {
    /// File attachment.
    File {
        /// `file://` URL of the attachment.
        file: String,
        /// Display name shown to recipients.
        name: String,
    },
    /// Plain text.
    Text {
        /// Message text.
        text: String,
    },
}

impl OutboundSegment {
    /// Creates a file segment for a resolved image.
    #[must_use]
    pub fn file(image: &ResolvedImage) -> Self {
        Self::File {
            file: image.file_url(),
            name: image.filename().to_string(),
        }
    }

    /// Creates a text segment.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ImageExtension;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_file_segment_shape() {
        let image = ResolvedImage::new(PathBuf::from("/cache/a.gif"), ImageExtension::Gif);
        let value = serde_json::to_value(OutboundSegment::file(&image)).unwrap();

        assert_eq!(
            value,
            json!({"type": "file", "data": {"file": "file:///cache/a.gif", "name": "图片.gif"}})
        );
    }

    #[test]
    fn test_text_segment_shape() {
        let value = serde_json::to_value(OutboundSegment::text("图片下载失败")).unwrap();
        assert_eq!(value, json!({"type": "text", "data": {"text": "图片下载失败"}}));
    }
}
