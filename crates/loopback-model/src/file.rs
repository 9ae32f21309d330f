//! Files stored in a container and the repository that uploads them.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use loopback_core::contract::{RouteTemplate, Verb};
use loopback_core::error::AppError;
use loopback_core::result::AppResult;
use loopback_core::traits::adapter::{Adapter, ByteSource, ByteStream, UploadRequest};
use loopback_core::traits::repository::Repository;
use loopback_core::traits::transferable::FileTransferable;
use loopback_core::types::record::{Properties, Record};

use crate::container::{CONTAINERS_CLASS, Container};
use crate::repository::{ModelRepository, expect_array, params};
use crate::transfer;

/// Upper bound on the buffer reserved up front from the reported size.
const PREALLOC_LIMIT: usize = 8 * 1024 * 1024;

/// File routes, relative to `/containers`.
pub mod routes {
    use super::*;

    /// `POST /containers/:container/upload`, multipart field `file`.
    pub const UPLOAD: RouteTemplate = RouteTemplate::new(Verb::Post, "/:container/upload");
    /// `GET /containers/:container/download/:name`
    pub const DOWNLOAD: RouteTemplate =
        RouteTemplate::new(Verb::Get, "/:container/download/:name");
    /// `GET /containers/:container/files/:name`
    pub const GET: RouteTemplate = RouteTemplate::new(Verb::Get, "/:container/files/:name");
    /// `GET /containers/:container/files`
    pub const ALL: RouteTemplate = RouteTemplate::new(Verb::Get, "/:container/files");
    /// `DELETE /containers/:container/files/:name`
    pub const DELETE: RouteTemplate = RouteTemplate::new(Verb::Delete, "/:container/files/:name");
}

/// A binary resource stored under a name in one container.
#[derive(Debug, Clone)]
pub struct File {
    record: Record,
    name: String,
    deleted: bool,
    repository: FileRepository,
}

impl File {
    /// The container this file belongs to.
    pub fn container(&self) -> &Container {
        self.repository.container()
    }

    /// The repository this file was obtained from.
    pub fn repository(&self) -> &FileRepository {
        &self.repository
    }

    /// Change the name this handle refers to.
    ///
    /// Only the local handle changes; the stored file is not renamed.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Content type reported by the server.
    pub fn content_type(&self) -> Option<&str> {
        self.record
            .get_str("type")
            .or_else(|| self.record.get_str("contentType"))
    }

    /// Size in bytes reported by the server.
    pub fn size(&self) -> Option<u64> {
        self.record.get("size").and_then(Value::as_u64)
    }

    /// Last modification time reported by the server.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        let mtime = self.record.get_str("mtime")?;
        DateTime::parse_from_rfc3339(mtime)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Extra metadata properties reported by the server.
    pub fn properties(&self) -> &Properties {
        self.record.properties()
    }

    /// Whether [`FileTransferable::delete`] succeeded on this handle.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn route_params(&self) -> Properties {
        params([
            ("container", json!(self.container().name())),
            ("name", json!(self.name)),
        ])
    }

    fn ensure_live(&self) -> AppResult<()> {
        if self.deleted {
            return Err(AppError::validation(format!(
                "File {} was deleted from container {}",
                self.name,
                self.container().name()
            )));
        }
        Ok(())
    }

    async fn open_download(&self) -> AppResult<ByteStream> {
        self.ensure_live()?;
        let base = self.repository.base();
        let segments = base.segments(&routes::DOWNLOAD, &self.route_params())?;
        debug!(
            container = self.container().name(),
            name = %self.name,
            "Downloading file"
        );
        base.adapter().download(segments).await
    }
}

#[async_trait]
impl FileTransferable for File {
    fn name(&self) -> &str {
        &self.name
    }

    async fn download_to_path(&self, path: &Path) -> AppResult<u64> {
        let stream = self.open_download().await?;
        let bytes = transfer::copy_to_path(stream, path).await?;
        info!(name = %self.name, path = %path.display(), bytes, "File downloaded");
        Ok(bytes)
    }

    async fn download_to_writer<W>(&self, writer: &mut W) -> AppResult<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let stream = self.open_download().await?;
        let bytes = transfer::copy_stream(stream, writer).await?;
        info!(name = %self.name, bytes, "File downloaded");
        Ok(bytes)
    }

    async fn download_bytes(&self) -> AppResult<Bytes> {
        let stream = self.open_download().await?;
        let reserve = self
            .size()
            .and_then(|size| usize::try_from(size).ok())
            .map_or(0, |size| size.min(PREALLOC_LIMIT));
        let mut buffer = Vec::with_capacity(reserve);
        let bytes = transfer::copy_stream(stream, &mut buffer).await?;
        info!(name = %self.name, bytes, "File downloaded");
        Ok(Bytes::from(buffer))
    }

    async fn delete(&mut self) -> AppResult<()> {
        self.ensure_live()?;
        self.repository
            .base()
            .invoke(&routes::DELETE, &self.route_params(), None)
            .await?;
        info!(container = self.container().name(), name = %self.name, "File deleted");
        self.deleted = true;
        Ok(())
    }
}

/// Container-scoped file operations.
#[derive(Debug, Clone)]
pub struct FileRepository {
    base: ModelRepository,
    container: Arc<Container>,
}

impl FileRepository {
    /// Create a repository scoped to `container`.
    ///
    /// Applications normally obtain one from
    /// [`RepositoryRegistry::files`](crate::RepositoryRegistry::files).
    pub fn new(container: Container, adapter: Arc<dyn Adapter>) -> Self {
        Self {
            base: ModelRepository::new(CONTAINERS_CLASS, adapter),
            container: Arc::new(container),
        }
    }

    /// The container every operation is scoped to.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The underlying request router.
    pub fn base(&self) -> &ModelRepository {
        &self.base
    }

    /// Whether two handles refer to the same repository instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.base.ptr_eq(&other.base)
    }

    /// A local handle to a named file, without contacting the server.
    pub fn file(&self, name: impl Into<String>) -> File {
        File {
            record: Record::default(),
            name: name.into(),
            deleted: false,
            repository: self.clone(),
        }
    }

    /// Upload a local file. Name and content type come from the path.
    pub async fn upload_from_path(&self, path: impl AsRef<Path>) -> AppResult<File> {
        let upload = transfer::open_local(path.as_ref()).await?;
        self.upload_source(&upload.name, &upload.content_type, upload.source)
            .await
    }

    /// Upload an in-memory payload.
    pub async fn upload_bytes(
        &self,
        name: &str,
        data: impl Into<Bytes>,
        content_type: &str,
    ) -> AppResult<File> {
        self.upload_source(name, content_type, ByteSource::from_bytes(data))
            .await
    }

    /// Upload from a reader that yields exactly `length` bytes.
    pub async fn upload_stream<R>(
        &self,
        name: &str,
        reader: R,
        content_type: &str,
        length: u64,
    ) -> AppResult<File>
    where
        R: AsyncRead + Send + 'static,
    {
        self.upload_source(name, content_type, ByteSource::from_reader(reader, length))
            .await
    }

    /// Store `source` under `name` in this repository's container.
    pub async fn upload_source(
        &self,
        name: &str,
        content_type: &str,
        source: ByteSource,
    ) -> AppResult<File> {
        if name.is_empty() {
            return Err(AppError::validation("File name must not be empty"));
        }
        let segments = self.base.segments(
            &routes::UPLOAD,
            &params([("container", json!(self.container.name()))]),
        )?;
        let length = source.length;
        let response = self
            .base
            .adapter()
            .upload(UploadRequest {
                segments,
                file_name: name.to_string(),
                content_type: content_type.to_string(),
                source,
            })
            .await?;

        info!(
            container = self.container.name(),
            name,
            bytes = length,
            "File uploaded"
        );
        let mut file = self.file_from_value(upload_entry(response)?)?;
        if file.name.is_empty() {
            file.name = name.to_string();
        }
        Ok(file)
    }

    /// Fetch the metadata of one named file.
    pub async fn get_file(&self, name: &str) -> AppResult<File> {
        let value = self
            .base
            .invoke(
                &routes::GET,
                &params([
                    ("container", json!(self.container.name())),
                    ("name", json!(name)),
                ]),
                None,
            )
            .await?;
        if value.is_null() {
            return Err(AppError::not_found(format!(
                "No file {name} in container {}",
                self.container.name()
            )));
        }
        let mut file = self.file_from_value(value)?;
        if file.name.is_empty() {
            file.name = name.to_string();
        }
        Ok(file)
    }

    /// Fetch every file in the container, in server order.
    pub async fn all_files(&self) -> AppResult<Vec<File>> {
        let value = self
            .base
            .invoke(
                &routes::ALL,
                &params([("container", json!(self.container.name()))]),
                None,
            )
            .await?;
        expect_array(value, "files")?
            .into_iter()
            .map(|item| self.file_from_value(item))
            .collect()
    }

    /// Build a file from server metadata. The container is always this
    /// repository's, whatever the payload says.
    fn file_from_value(&self, value: Value) -> AppResult<File> {
        let Value::Object(mut properties) = value else {
            return Err(AppError::invalid_response("File payload is not an object"));
        };
        let name = match properties.remove("name") {
            Some(Value::String(name)) => name,
            _ => String::new(),
        };
        properties.remove("container");
        Ok(File {
            record: Record::from_value(Value::Object(properties))?,
            name,
            deleted: false,
            repository: self.clone(),
        })
    }
}

/// Pull the stored file out of an upload response.
///
/// The storage component answers `{"result": {"files": {"file": [{..}]}}}`;
/// a bare file object is accepted too.
fn upload_entry(response: Value) -> AppResult<Value> {
    let Some(files) = response.pointer("/result/files") else {
        return match response {
            Value::Object(_) => Ok(response),
            _ => Err(AppError::invalid_response("Upload response is not an object")),
        };
    };
    files
        .as_object()
        .and_then(|fields| fields.values().find_map(|v| v.as_array()?.first()))
        .cloned()
        .ok_or_else(|| AppError::invalid_response("Upload response lists no stored file"))
}

#[async_trait]
impl Repository<File, str> for FileRepository {
    async fn find_by_id(&self, name: &str) -> AppResult<File> {
        self.get_file(name).await
    }

    async fn all(&self) -> AppResult<Vec<File>> {
        self.all_files().await
    }
}
