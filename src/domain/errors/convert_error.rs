//! Sticker conversion error types.

use thiserror::Error;

use super::BotApiError;

/// Reply sent when a hosted sticker could not be downloaded.
pub const DOWNLOAD_FAILED_REPLY: &str = "图片下载失败";

/// Reply sent when the bot endpoint could not locate the image.
pub const LOOKUP_FAILED_REPLY: &str = "图片获取失败";

/// Remote image download failure.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("request failed: {message}")]
    Transport { message: String },

    #[error("failed to write image: {message}")]
    Io { message: String },
}

impl FetchError {
    /// Creates transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates IO error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Conversion error variants.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum ConvertError {
    #[error("image lookup failed: {0}")]
    HostLookup(#[source] BotApiError),

    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to send reply: {0}")]
    Send(#[source] BotApiError),
}

impl ConvertError {
    /// Creates download error.
    #[must_use]
    pub fn download(url: impl Into<String>, source: FetchError) -> Self {
        Self::Download {
            url: url.into(),
            source,
        }
    }

    /// Text reported back to the chat, if the error has one.
    #[must_use]
    pub const fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::HostLookup(_) => Some(LOOKUP_FAILED_REPLY),
            Self::Download { .. } => Some(DOWNLOAD_FAILED_REPLY),
            Self::Send(_) => None,
        }
    }
}
