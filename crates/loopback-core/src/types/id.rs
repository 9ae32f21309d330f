//! Server-assigned model identifiers.
//!
//! LoopBack data sources mint either numeric or string ids depending on the
//! connector, so [`ModelId`] accepts both and serializes back to the same
//! JSON shape it was read from.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of a persisted model instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelId {
    /// Numeric id (memory and SQL connectors).
    Number(i64),
    /// String id (MongoDB ObjectIds, UUIDs, natural keys).
    Text(String),
}

impl ModelId {
    /// Read an id out of a JSON value.
    ///
    /// Returns `None` for `null` and for values that cannot be an id
    /// (booleans, arrays, objects). Numbers outside the `i64` range are kept
    /// verbatim as text.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(
                n.as_i64()
                    .map(Self::Number)
                    .unwrap_or_else(|| Self::Text(n.to_string())),
            ),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Convert the id back into its JSON form.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::from(*n),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ModelId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for ModelId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for ModelId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}
