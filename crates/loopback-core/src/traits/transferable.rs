//! Transfer operations of a single stored file.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWrite;

use crate::result::AppResult;

/// A local handle to a file stored in a container.
///
/// The three downloads issue the same remote fetch and differ only in where
/// the bytes go. Each resolves after the sink has been fully written and
/// flushed, returning the number of bytes transferred where applicable.
#[async_trait]
pub trait FileTransferable: Send + Sync {
    /// Server-visible file name.
    fn name(&self) -> &str;

    /// Write the file content to a local path, replacing any existing file.
    async fn download_to_path(&self, path: &Path) -> AppResult<u64>;

    /// Write the file content incrementally into `writer`.
    async fn download_to_writer<W>(&self, writer: &mut W) -> AppResult<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized;

    /// Buffer the whole file content in memory.
    async fn download_bytes(&self) -> AppResult<Bytes>;

    /// Remove the file from its container on the server.
    async fn delete(&mut self) -> AppResult<()>;
}
