use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::domain::errors::FetchError;
use crate::domain::ports::ImageFetchPort;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Downloads images with a plain HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    http_client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Transport` if the client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http_client })
    }

    #[must_use]
    pub const fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    async fn download(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(format!("Request failed: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(format!("Failed to read body: {e}")))
    }

    async fn write_file(destination: &Path, body: &[u8]) -> Result<(), FetchError> {
        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchError::io(format!("Failed to create {}: {e}", parent.display())))?;
        }

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| FetchError::io(format!("Failed to create {}: {e}", destination.display())))?;
        file.write_all(body)
            .await
            .map_err(|e| FetchError::io(e.to_string()))?;
        file.flush().await.map_err(|e| FetchError::io(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ImageFetchPort for HttpImageFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), FetchError> {
        let body = self.download(url).await.inspect_err(|e| {
            error!(url = %url, error = %e, "Image download failed");
        })?;

        Self::write_file(destination, &body).await.inspect_err(|e| {
            error!(path = %destination.display(), error = %e, "Failed to store downloaded image");
        })?;

        debug!(
            url = %url,
            path = %destination.display(),
            bytes = body.len(),
            "Image downloaded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use tempfile::tempdir;

    const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/club/item/raw300.gif", get(|| async { GIF_BYTES }))
            .route("/missing", get(|| async { AxumStatus::NOT_FOUND }))
            .route("/empty", get(|| async { AxumStatus::NO_CONTENT }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetch_writes_body_and_creates_directory() {
        let base = spawn_server().await;
        let dir = tempdir().unwrap();
        let destination = dir.path().join("downloaded_files").join("sticker.jpg");

        let fetcher = HttpImageFetcher::new().unwrap();
        fetcher
            .fetch(&format!("{base}/club/item/raw300.gif"), &destination)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), GIF_BYTES);
    }

    #[tokio::test]
    async fn test_fetch_overwrites_existing_file() {
        let base = spawn_server().await;
        let dir = tempdir().unwrap();
        let destination = dir.path().join("sticker.jpg");
        std::fs::write(&destination, b"stale contents that are longer than the gif").unwrap();

        let fetcher = HttpImageFetcher::new().unwrap();
        fetcher
            .fetch(&format!("{base}/club/item/raw300.gif"), &destination)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), GIF_BYTES);
    }

    #[tokio::test]
    async fn test_not_found_is_a_status_error() {
        let base = spawn_server().await;
        let dir = tempdir().unwrap();
        let destination = dir.path().join("sticker.jpg");

        let fetcher = HttpImageFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("{base}/missing"), &destination)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404 }));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_only_200_counts_as_success() {
        let base = spawn_server().await;
        let dir = tempdir().unwrap();

        let fetcher = HttpImageFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("{base}/empty"), &dir.path().join("sticker.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 204 }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempdir().unwrap();
        let fetcher = HttpImageFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("http://{addr}/x.gif"), &dir.path().join("x.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
