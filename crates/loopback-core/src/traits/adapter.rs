//! Transport adapter trait for talking to a LoopBack server.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, stream};
use serde_json::Value;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::contract::Verb;
use crate::result::AppResult;

/// A byte stream type used for upload and download bodies.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// A JSON request against the REST API.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    /// HTTP verb.
    pub verb: Verb,
    /// Unencoded path segments below the API root.
    pub segments: Vec<String>,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl RestRequest {
    /// Create a request without query or body.
    pub fn new(verb: Verb, segments: Vec<String>) -> Self {
        Self {
            verb,
            segments,
            query: Vec::new(),
            body: None,
        }
    }

    /// Set the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a query pair.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// The request path, `/`-joined, for logging.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Bytes to upload together with their exact length.
///
/// The transport frames the upload with `length`; a stream that yields a
/// different number of bytes makes the upload fail in the transport.
pub struct ByteSource {
    /// The content.
    pub stream: ByteStream,
    /// Number of bytes `stream` will yield.
    pub length: u64,
}

impl ByteSource {
    /// Wrap an in-memory buffer.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let length = data.len() as u64;
        Self {
            stream: Box::pin(stream::once(async move { Ok(data) })),
            length,
        }
    }

    /// Wrap an async reader that yields exactly `length` bytes.
    pub fn from_reader<R>(reader: R, length: u64) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            stream: Box::pin(ReaderStream::new(reader)),
            length,
        }
    }
}

impl std::fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteSource")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// A multipart file upload.
#[derive(Debug)]
pub struct UploadRequest {
    /// Unencoded path segments of the upload route.
    pub segments: Vec<String>,
    /// File name the server should store the content under.
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// The content.
    pub source: ByteSource,
}

/// Trait for transports that carry SDK calls to the server.
///
/// The REST implementation lives in `loopback-rest`. Every method resolves
/// exactly once: `Ok` with the decoded response, or `Err` with the failure.
/// Implementations do not retry.
#[async_trait]
pub trait Adapter: Send + Sync + std::fmt::Debug + 'static {
    /// Send a JSON request and decode the JSON response.
    ///
    /// An empty success body decodes to `Value::Null`.
    async fn request(&self, request: RestRequest) -> AppResult<Value>;

    /// Upload a file and decode the JSON response.
    async fn upload(&self, request: UploadRequest) -> AppResult<Value>;

    /// Download the body at the given path as a stream.
    async fn download(&self, segments: Vec<String>) -> AppResult<ByteStream>;
}
