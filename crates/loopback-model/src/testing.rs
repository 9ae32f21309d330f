//! Scripted adapter used by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};
use serde_json::Value;

use loopback_core::contract::Verb;
use loopback_core::error::AppError;
use loopback_core::result::AppResult;
use loopback_core::traits::adapter::{Adapter, ByteStream, RestRequest, UploadRequest};

/// A scripted reply, consumed in order.
#[derive(Debug)]
pub(crate) enum Reply {
    Json(Value),
    Body(Vec<Bytes>),
    /// Yields the chunks, then breaks with an I/O error.
    BrokenBody(Vec<Bytes>),
    Fail(AppError),
}

/// One request as the adapter received it.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub verb: Verb,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub upload: Option<RecordedUpload>,
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Adapter that records every request and answers from a script.
///
/// Uploads are drained and checked against their declared length the way
/// an HTTP transport frames them.
#[derive(Debug, Default)]
pub(crate) struct RecordingAdapter {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Recorded>>,
}

impl RecordingAdapter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, reply: Reply) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn reply_json(&self, value: Value) -> &Self {
        self.reply(Reply::Json(value))
    }

    pub fn fail(&self, error: AppError) -> &Self {
        self.reply(Reply::Fail(error))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record(&self, recorded: Recorded) {
        self.requests.lock().unwrap().push(recorded);
    }

    fn next(&self) -> AppResult<Reply> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::internal("No scripted reply left"))
    }

    fn next_json(&self) -> AppResult<Value> {
        match self.next()? {
            Reply::Json(value) => Ok(value),
            Reply::Fail(error) => Err(error),
            Reply::Body(_) | Reply::BrokenBody(_) => {
                Err(AppError::internal("Scripted a body for a JSON request"))
            }
        }
    }
}

#[async_trait]
impl Adapter for RecordingAdapter {
    async fn request(&self, request: RestRequest) -> AppResult<Value> {
        self.record(Recorded {
            verb: request.verb,
            path: request.path(),
            query: request.query.clone(),
            body: request.body.clone(),
            upload: None,
        });
        self.next_json()
    }

    async fn upload(&self, request: UploadRequest) -> AppResult<Value> {
        let mut data = Vec::new();
        let mut stream = request.source.stream;
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk?);
        }
        self.record(Recorded {
            verb: Verb::Post,
            path: format!("/{}", request.segments.join("/")),
            query: Vec::new(),
            body: None,
            upload: Some(RecordedUpload {
                file_name: request.file_name,
                content_type: request.content_type,
                data: data.clone(),
            }),
        });
        if data.len() as u64 != request.source.length {
            return Err(AppError::transport(format!(
                "Body yielded {} bytes, declared {}",
                data.len(),
                request.source.length
            )));
        }
        self.next_json()
    }

    async fn download(&self, segments: Vec<String>) -> AppResult<ByteStream> {
        self.record(Recorded {
            verb: Verb::Get,
            path: format!("/{}", segments.join("/")),
            query: Vec::new(),
            body: None,
            upload: None,
        });
        match self.next()? {
            Reply::Body(chunks) => Ok(Box::pin(stream::iter(
                chunks.into_iter().map(Ok::<Bytes, std::io::Error>),
            ))),
            Reply::BrokenBody(chunks) => {
                let broken = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
                Ok(Box::pin(stream::iter(
                    chunks
                        .into_iter()
                        .map(Ok::<Bytes, std::io::Error>)
                        .chain(std::iter::once(Err(broken))),
                )))
            }
            Reply::Fail(error) => Err(error),
            Reply::Json(_) => Err(AppError::internal("Scripted JSON for a download")),
        }
    }
}
