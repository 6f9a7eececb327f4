//! Sticker conversion use case implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempPath;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, warn};

use crate::application::dto::{ConvertOutcome, ConvertRequest};
use crate::application::services::{MessageScanner, create_scratch_file};
use crate::domain::entities::{
    ConversationTarget, ImageExtension, ImageOrigin, MessageId, MessagePart, OutboundSegment,
    ResolvedImage,
};
use crate::domain::errors::{BotApiError, ConvertError, FetchError};
use crate::domain::ports::{BotApiPort, ImageFetchPort};

/// Bytes read from a cached image when its extension says nothing.
const SNIFF_LEN: usize = 16;

/// Turns the image referenced by a command message into a file attachment.
#[derive(Clone)]
pub struct ConvertStickerUseCase {
    bot_api: Arc<dyn BotApiPort>,
    fetcher: Arc<dyn ImageFetchPort>,
    download_dir: PathBuf,
}

impl ConvertStickerUseCase {
    /// Creates new conversion use case.
    ///
    /// Hosted stickers are downloaded into `download_dir`.
    #[must_use]
    pub fn new(
        bot_api: Arc<dyn BotApiPort>,
        fetcher: Arc<dyn ImageFetchPort>,
        download_dir: PathBuf,
    ) -> Self {
        let download_dir = std::path::absolute(&download_dir).unwrap_or(download_dir);
        Self {
            bot_api,
            fetcher,
            download_dir,
        }
    }

    /// Directory hosted stickers are downloaded into.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Executes the conversion for one command message.
    ///
    /// Only the first image or reply part is considered. Lookup and download
    /// failures are reported to the chat as text.
    ///
    /// # Errors
    /// Returns error if the reply itself could not be sent.
    pub async fn execute(&self, request: ConvertRequest) -> Result<ConvertOutcome, ConvertError> {
        let Some(part) = MessageScanner::first_candidate(&request.parts) else {
            debug!(message_id = %request.message_id, "No image or reply in command message");
            return Ok(ConvertOutcome::NothingToConvert);
        };

        let origin = match self.classify(part).await {
            Ok(Some(origin)) => origin,
            Ok(None) => {
                debug!(message_id = %request.message_id, "Quoted message contains no image");
                return Ok(ConvertOutcome::NothingToConvert);
            }
            Err(e) => return self.report_failure(request.target, e).await,
        };

        info!(
            message_id = %request.message_id,
            origin = origin.label(),
            target = %request.target,
            "Converting image"
        );

        let (image, scratch) = match self.resolve(origin).await {
            Ok(resolved) => resolved,
            Err(e) => return self.report_failure(request.target, e).await,
        };

        self.send(request.target, vec![OutboundSegment::file(&image)])
            .await
            .map_err(ConvertError::Send)?;

        info!(
            filename = image.filename(),
            path = %image.local_path().display(),
            extension = %image.extension(),
            "Sent image as file"
        );

        // The protocol side has read the file once the send returns.
        drop(scratch);

        Ok(ConvertOutcome::Sent {
            filename: image.filename().to_string(),
        })
    }

    async fn classify(&self, part: &MessagePart) -> Result<Option<ImageOrigin>, ConvertError> {
        match part {
            MessagePart::Image { file, .. } => Ok(Some(ImageOrigin::Inline {
                file_id: file.clone(),
            })),
            MessagePart::Reply { id } => {
                let quoted = self.fetch_quoted(*id).await?;
                Ok(MessageScanner::first_image(&quoted).and_then(quoted_origin))
            }
            MessagePart::Text { .. } | MessagePart::Other { .. } => Ok(None),
        }
    }

    async fn fetch_quoted(&self, id: MessageId) -> Result<Vec<MessagePart>, ConvertError> {
        self.bot_api.get_msg(id).await.map_err(|e| {
            error!(message_id = %id, error = %e, "Failed to fetch quoted message");
            ConvertError::HostLookup(e)
        })
    }

    async fn resolve(
        &self,
        origin: ImageOrigin,
    ) -> Result<(ResolvedImage, Option<TempPath>), ConvertError> {
        match origin {
            ImageOrigin::Inline { file_id } | ImageOrigin::Quoted { file_id } => {
                Ok((self.lookup_cached(&file_id).await?, None))
            }
            ImageOrigin::QuotedHosted { url } => {
                let scratch = create_scratch_file(&self.download_dir).await.map_err(|e| {
                    error!(dir = %self.download_dir.display(), error = %e, "Failed to create scratch file");
                    ConvertError::download(&url, FetchError::io(e.to_string()))
                })?;

                debug!(url = %url, path = %scratch.display(), "Downloading hosted sticker");

                self.fetcher
                    .fetch(&url, &scratch)
                    .await
                    .map_err(|e| {
                        error!(url = %url, error = %e, "Failed to download hosted sticker");
                        ConvertError::download(&url, e)
                    })?;

                let image = ResolvedImage::hosted_sticker(scratch.to_path_buf());
                Ok((image, Some(scratch)))
            }
        }
    }

    async fn lookup_cached(&self, file_id: &str) -> Result<ResolvedImage, ConvertError> {
        let path = self.bot_api.get_image(file_id).await.map_err(|e| {
            error!(file_id, error = %e, "Failed to look up cached image");
            ConvertError::HostLookup(e)
        })?;
        let path = std::path::absolute(&path).unwrap_or(path);

        let mut extension = ImageExtension::from_path(&path);
        if !extension.is_known()
            && let Some(sniffed) = sniff_file(&path).await
        {
            debug!(path = %path.display(), detected = %sniffed, "Detected image format from content");
            extension = sniffed;
        }

        Ok(ResolvedImage::new(path, extension))
    }

    async fn report_failure(
        &self,
        target: ConversationTarget,
        error: ConvertError,
    ) -> Result<ConvertOutcome, ConvertError> {
        let Some(reply) = error.user_message() else {
            return Err(error);
        };

        warn!(target = %target, error = %error, "Image conversion failed");

        self.send(target, vec![OutboundSegment::text(reply)])
            .await
            .map_err(ConvertError::Send)?;

        Ok(ConvertOutcome::FailureReported { reply })
    }

    async fn send(
        &self,
        target: ConversationTarget,
        message: Vec<OutboundSegment>,
    ) -> Result<Option<MessageId>, BotApiError> {
        match target {
            ConversationTarget::Private { user_id } => {
                self.bot_api.send_private_msg(user_id, message).await
            }
            ConversationTarget::Group { group_id } => {
                self.bot_api.send_group_msg(group_id, message).await
            }
        }
    }
}

fn quoted_origin(part: &MessagePart) -> Option<ImageOrigin> {
    match part {
        MessagePart::Image { url: Some(url), .. } if part.is_hosted_sticker() => {
            Some(ImageOrigin::QuotedHosted { url: url.clone() })
        }
        MessagePart::Image { file, .. } => Some(ImageOrigin::Quoted {
            file_id: file.clone(),
        }),
        MessagePart::Reply { .. } | MessagePart::Text { .. } | MessagePart::Other { .. } => None,
    }
}

async fn sniff_file(path: &Path) -> Option<ImageExtension> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot open image for format detection");
            return None;
        }
    };

    let mut header = [0u8; SNIFF_LEN];
    let read = file.read(&mut header).await.ok()?;
    ImageExtension::sniff(&header[..read])
}
