//! Per-invocation scratch files for downloaded stickers.

use std::io;
use std::path::Path;

use tempfile::{Builder, TempPath};
use tracing::trace;

/// Creates an empty, uniquely named `sticker-*.jpg` file inside `dir`.
///
/// The directory is created if it does not exist yet. The file is removed
/// when the returned path is dropped.
///
/// # Errors
/// Returns error if the directory or the file cannot be created.
pub async fn create_scratch_file(dir: &Path) -> io::Result<TempPath> {
    tokio::fs::create_dir_all(dir).await?;

    let path = Builder::new()
        .prefix("sticker-")
        .suffix(".jpg")
        .tempfile_in(dir)?
        .into_temp_path();

    trace!(path = %path.display(), "Created scratch file");
    Ok(path)
}
