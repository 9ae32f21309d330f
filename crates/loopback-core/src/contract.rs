//! REST route templates.
//!
//! A route is a verb plus a path pattern relative to a repository's class
//! name, with `:param` placeholders filled from request parameters:
//!
//! ```
//! use loopback_core::contract::{RouteTemplate, Verb};
//! use serde_json::json;
//!
//! let route = RouteTemplate::new(Verb::Put, "/:id");
//! let params = json!({"id": 7}).as_object().cloned().unwrap();
//! assert_eq!(route.expand("widgets", &params).unwrap(), vec!["widgets", "7"]);
//! ```

use std::fmt;

use serde_json::Value;

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::record::Properties;

/// HTTP verb of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Verb {
    /// The verb as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verb and a path pattern such as `"/:container/files/:name"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTemplate {
    /// HTTP verb.
    pub verb: Verb,
    /// Path pattern relative to the class name. `"/"` addresses the class.
    pub pattern: &'static str,
}

impl RouteTemplate {
    /// Create a route template.
    pub const fn new(verb: Verb, pattern: &'static str) -> Self {
        Self { verb, pattern }
    }

    /// Expand the pattern into unencoded path segments, class name first.
    ///
    /// Fails with a validation error if a placeholder has no matching
    /// parameter or the parameter is not a string or number.
    pub fn expand(&self, class_name: &str, params: &Properties) -> AppResult<Vec<String>> {
        let mut segments = vec![class_name.to_string()];
        for part in self.pattern.split('/').filter(|p| !p.is_empty()) {
            match part.strip_prefix(':') {
                Some(name) => segments.push(param(name, params, self)?),
                None => segments.push(part.to_string()),
            }
        }
        Ok(segments)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.pattern)
    }
}

fn param(name: &str, params: &Properties, route: &RouteTemplate) -> AppResult<String> {
    match params.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(_)) => Err(AppError::validation(format!(
            "Parameter '{name}' for route {route} must not be empty"
        ))),
        Some(Value::Null) | None => Err(AppError::validation(format!(
            "Missing parameter '{name}' for route {route}"
        ))),
        Some(_) => Err(AppError::validation(format!(
            "Parameter '{name}' for route {route} must be a string or number"
        ))),
    }
}
