//! Port definition for remote image downloads.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::FetchError;

/// Port for downloading an image to local storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Downloads `url` into `destination`, overwriting it.
    ///
    /// The destination's parent directory is created when missing.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), FetchError>;
}
