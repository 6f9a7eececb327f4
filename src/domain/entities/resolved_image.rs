//! Image source classification and outbound file naming.

use std::fmt;
use std::path::{Path, PathBuf};

/// Stem of every filename the bot sends back.
pub const DISPLAY_STEM: &str = "图片";

/// Extension used when nothing better can be determined.
const FALLBACK_EXTENSION: &str = "jpg";

/// Image format as far as outbound naming is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ImageExtension {
    Jpg,
    Png,
    Gif,
    /// Anything else, keeping the raw extension when there was one.
    Unknown(Option<String>),
}

impl ImageExtension {
    /// Maps a bare extension (without the dot) to a known format.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpg,
            "png" => Self::Png,
            "gif" => Self::Gif,
            "" => Self::Unknown(None),
            other => Self::Unknown(Some(other.to_string())),
        }
    }

    /// Infers the format from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Unknown(None), Self::from_extension)
    }

    /// Detects the format from the leading bytes of a file.
    #[must_use]
    pub fn sniff(header: &[u8]) -> Option<Self> {
        let format = image::guess_format(header).ok()?;
        format
            .extensions_str()
            .first()
            .map(|ext| Self::from_extension(ext))
    }

    /// Returns true unless the format is unknown.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Extension written into the outbound filename.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Unknown(Some(ext)) => ext,
            Self::Unknown(None) => FALLBACK_EXTENSION,
        }
    }

    /// Display filename for an image of this format.
    #[must_use]
    pub fn filename(&self) -> String {
        format!("{DISPLAY_STEM}.{}", self.as_str())
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(_) => write!(f, "unknown"),
            known => write!(f, "{}", known.as_str()),
        }
    }
}

/// Where the image to convert comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ImageOrigin {
    /// Attached to the command message itself.
    Inline { file_id: String },
    /// Attached to the quoted message and cached by the protocol side.
    Quoted { file_id: String },
    /// Hosted sticker in the quoted message, only reachable over HTTP.
    QuotedHosted { url: String },
}

impl ImageOrigin {
    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Inline { .. } => "inline",
            Self::Quoted { .. } => "quoted",
            Self::QuotedHosted { .. } => "quoted-hosted",
        }
    }
}

/// Image that exists on local storage and is ready to be sent as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    local_path: PathBuf,
    filename: String,
    extension: ImageExtension,
}

impl ResolvedImage {
    /// Creates a resolved image named after its extension.
    #[must_use]
    pub fn new(local_path: PathBuf, extension: ImageExtension) -> Self {
        Self {
            local_path,
            filename: extension.filename(),
            extension,
        }
    }

    /// Creates a resolved image for a downloaded hosted sticker.
    ///
    /// Hosted stickers are always named as JPEG, whatever the actual bytes are.
    #[must_use]
    pub fn hosted_sticker(local_path: PathBuf) -> Self {
        Self::new(local_path, ImageExtension::Jpg)
    }

    /// Path of the image on local storage.
    #[must_use]
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Display filename of the outbound attachment.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Detected format.
    #[must_use]
    pub const fn extension(&self) -> &ImageExtension {
        &self.extension
    }

    /// `file://` URL understood by the protocol side.
    #[must_use]
    pub fn file_url(&self) -> String {
        format!("file://{}", self.local_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/tmp/a.jpg", "图片.jpg" ; "jpg")]
    #[test_case("/tmp/a.png", "图片.png" ; "png")]
    #[test_case("/tmp/a.gif", "图片.gif" ; "gif")]
    #[test_case("/tmp/a.JPEG", "图片.jpg" ; "jpeg_uppercase")]
    #[test_case("/tmp/a.webp", "图片.webp" ; "unknown_keeps_extension")]
    #[test_case("/tmp/a", "图片.jpg" ; "no_extension_falls_back")]
    fn test_filename_from_path(path: &str, expected: &str) {
        let ext = ImageExtension::from_path(Path::new(path));
        assert_eq!(ext.filename(), expected);
    }

    #[test]
    fn test_sniff_detects_png_and_gif() {
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        let gif = b"GIF89a\x01\x00\x01\x00";

        assert_eq!(ImageExtension::sniff(png), Some(ImageExtension::Png));
        assert_eq!(ImageExtension::sniff(gif), Some(ImageExtension::Gif));
        assert_eq!(ImageExtension::sniff(b"not an image"), None);
    }

    #[test]
    fn test_hosted_sticker_is_always_jpg() {
        let image = ResolvedImage::hosted_sticker(PathBuf::from("/data/sticker.bin"));
        assert_eq!(image.filename(), "图片.jpg");
        assert_eq!(image.file_url(), "file:///data/sticker.bin");
    }

    #[test]
    fn test_unknown_display() {
        assert_eq!(ImageExtension::Unknown(Some("webp".into())).to_string(), "unknown");
        assert_eq!(ImageExtension::Gif.to_string(), "gif");
        assert!(!ImageExtension::Unknown(None).is_known());
    }
}
