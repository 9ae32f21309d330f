//! Shared request plumbing for all model repositories.

use std::sync::Arc;

use serde_json::Value;

use loopback_core::contract::RouteTemplate;
use loopback_core::result::AppResult;
use loopback_core::traits::adapter::{Adapter, RestRequest};
use loopback_core::types::record::Properties;

/// Routes requests for one remote class (e.g. `"widgets"`, `"containers"`).
///
/// Holds no per-call state. Clones share the same inner data, so every
/// model built by a repository refers back to it without owning it.
#[derive(Debug, Clone)]
pub struct ModelRepository {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    class_name: String,
    adapter: Arc<dyn Adapter>,
}

impl ModelRepository {
    /// Create a repository for the given class name.
    pub fn new(class_name: impl Into<String>, adapter: Arc<dyn Adapter>) -> Self {
        Self {
            inner: Arc::new(Inner {
                class_name: class_name.into(),
                adapter,
            }),
        }
    }

    /// The remote class name, used as the first path segment.
    pub fn class_name(&self) -> &str {
        &self.inner.class_name
    }

    /// The transport this repository sends requests through.
    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.inner.adapter
    }

    /// Whether two handles refer to the same repository instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Expand a route into path segments for this class.
    pub fn segments(&self, route: &RouteTemplate, params: &Properties) -> AppResult<Vec<String>> {
        route.expand(self.class_name(), params)
    }

    /// Build a request for a route without sending it.
    pub fn request(&self, route: &RouteTemplate, params: &Properties) -> AppResult<RestRequest> {
        Ok(RestRequest::new(route.verb, self.segments(route, params)?))
    }

    /// Send a request built by [`ModelRepository::request`].
    pub async fn send(&self, request: RestRequest) -> AppResult<Value> {
        self.inner.adapter.request(request).await
    }

    /// Expand a route, attach an optional JSON body, and send it.
    pub async fn invoke(
        &self,
        route: &RouteTemplate,
        params: &Properties,
        body: Option<Value>,
    ) -> AppResult<Value> {
        let request = self.request(route, params)?;
        let request = match body {
            Some(body) => request.with_body(body),
            None => request,
        };
        self.send(request).await
    }
}

/// Build route parameters from key/value pairs.
pub(crate) fn params<const N: usize>(pairs: [(&str, Value); N]) -> Properties {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Interpret a response that must be a JSON array.
pub(crate) fn expect_array(value: Value, what: &str) -> AppResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(loopback_core::error::AppError::invalid_response(format!(
            "Expected a list of {what}"
        ))),
    }
}
