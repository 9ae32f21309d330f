//! Byte source and sink adapters for file uploads and downloads.
//!
//! Every upload variant is reduced to a [`ByteSource`] and every download
//! variant copies a [`ByteStream`] into an [`AsyncWrite`] sink.

use std::path::Path;

use futures::StreamExt;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use loopback_core::error::{AppError, ErrorKind};
use loopback_core::result::AppResult;
use loopback_core::traits::adapter::{ByteSource, ByteStream};

/// Content type used when none can be inferred.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A local file prepared for upload.
#[derive(Debug)]
pub struct LocalUpload {
    /// Final path component, used as the stored file name.
    pub name: String,
    /// Content type inferred from the file extension.
    pub content_type: String,
    /// The file content.
    pub source: ByteSource,
}

/// Open a local file for upload, inferring its name and content type.
pub async fn open_local(path: &Path) -> AppResult<LocalUpload> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            AppError::validation(format!("Path has no file name: {}", path.display()))
        })?
        .to_string();

    let file = fs::File::open(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Io,
            format!("Failed to open upload source: {}", path.display()),
            e,
        )
    })?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(AppError::validation(format!(
            "Upload source is not a regular file: {}",
            path.display()
        )));
    }

    Ok(LocalUpload {
        content_type: content_type_for(&name),
        source: ByteSource::from_reader(file, metadata.len()),
        name,
    })
}

/// Guess the content type of a file name from its extension.
pub fn content_type_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

/// Copy a download stream into a sink and flush it.
///
/// Returns the number of bytes written. A stream error is reported as a
/// transport failure, a sink error as an I/O failure.
pub async fn copy_stream<W>(mut stream: ByteStream, writer: &mut W) -> AppResult<u64>
where
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    let mut total = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            AppError::with_source(ErrorKind::Transport, "Download interrupted", e)
        })?;
        writer.write_all(&chunk).await?;
        total += chunk.len() as u64;
    }
    writer.flush().await?;
    Ok(total)
}

/// Copy a download stream into a file at `path`.
///
/// The file is created (or truncated) only once the stream is available,
/// and removed again if the copy fails part way.
pub async fn copy_to_path(stream: ByteStream, path: &Path) -> AppResult<u64> {
    let mut file = fs::File::create(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Io,
            format!("Failed to create download target: {}", path.display()),
            e,
        )
    })?;

    match copy_stream(stream, &mut file).await {
        Ok(total) => {
            file.sync_all().await?;
            Ok(total)
        }
        Err(e) => {
            drop(file);
            let _ = fs::remove_file(path).await;
            Err(e)
        }
    }
}
