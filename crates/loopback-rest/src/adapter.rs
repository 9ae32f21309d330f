//! REST adapter backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, RequestBuilder, Response, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use loopback_core::config::RestConfig;
use loopback_core::contract::Verb;
use loopback_core::error::{AppError, ErrorKind};
use loopback_core::result::AppResult;
use loopback_core::traits::adapter::{Adapter, ByteStream, RestRequest, UploadRequest};

use crate::error::{status_error, transport_error};

/// Multipart field name the storage component reads uploads from.
const UPLOAD_FIELD: &str = "file";

/// HTTP transport for a LoopBack REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RestAdapter {
    client: reqwest::Client,
    base_url: Url,
    access_token: Option<String>,
}

impl RestAdapter {
    /// Create an adapter from configuration.
    pub fn new(config: &RestConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::configuration(format!("Invalid base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "Base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url,
            access_token: config.access_token.clone(),
        })
    }

    /// Root URL every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL for the given path segments, percent-encoding each one.
    pub fn url(&self, segments: &[String], query: &[(String, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    fn builder(&self, verb: Verb, url: Url) -> RequestBuilder {
        let method = match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        };
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.header(AUTHORIZATION, token),
            None => builder,
        }
    }

    /// Send a request and turn non-success statuses into errors.
    async fn send(&self, builder: RequestBuilder, verb: Verb, path: &str) -> AppResult<Response> {
        let response = builder.send().await.map_err(|e| {
            warn!(%verb, path, error = %e, "Request failed before a response");
            transport_error(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(%verb, path, status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let error = status_error(status, &body);
        warn!(%verb, path, status = status.as_u16(), message = %error.message, "Server returned an error");
        Err(error)
    }

    async fn decode(response: Response) -> AppResult<Value> {
        let body = response.bytes().await.map_err(transport_error)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| {
            AppError::with_source(
                ErrorKind::InvalidResponse,
                format!("Response is not valid JSON: {e}"),
                e,
            )
        })
    }
}

#[async_trait]
impl Adapter for RestAdapter {
    async fn request(&self, request: RestRequest) -> AppResult<Value> {
        let path = request.path();
        let url = self.url(&request.segments, &request.query);
        debug!(verb = %request.verb, path, "Sending request");

        let mut builder = self
            .builder(request.verb, url)
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = self.send(builder, request.verb, &path).await?;
        Self::decode(response).await
    }

    async fn upload(&self, request: UploadRequest) -> AppResult<Value> {
        let path = format!("/{}", request.segments.join("/"));
        let url = self.url(&request.segments, &[]);
        let length = request.source.length;
        debug!(path, file = %request.file_name, length, "Uploading file");

        let part = Part::stream_with_length(Body::wrap_stream(request.source.stream), length)
            .file_name(request.file_name.clone())
            .mime_str(&request.content_type)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Validation,
                    format!("Invalid content type '{}'", request.content_type),
                    e,
                )
            })?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let builder = self
            .builder(Verb::Post, url)
            .header(ACCEPT, "application/json")
            .multipart(form);
        let response = self.send(builder, Verb::Post, &path).await?;

        info!(path, file = %request.file_name, bytes = length, "Upload complete");
        Self::decode(response).await
    }

    async fn download(&self, segments: Vec<String>) -> AppResult<ByteStream> {
        let path = format!("/{}", segments.join("/"));
        let url = self.url(&segments, &[]);
        debug!(path, "Downloading file");

        let response = self.send(self.builder(Verb::Get, url), Verb::Get, &path).await?;
        let stream = response.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::pin(stream))
    }
}
