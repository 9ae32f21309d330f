//! The property bag behind every model instance.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::id::ModelId;

/// Untyped model properties, keyed by property name.
pub type Properties = Map<String, Value>;

/// Name of the identity property in LoopBack payloads.
pub const ID_PROPERTY: &str = "id";

/// Local copy of a server record: its properties plus its identity.
///
/// The id is kept outside the property bag so it cannot be overwritten by
/// [`Record::set`]; once assigned it never changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    properties: Properties,
    id: Option<ModelId>,
}

impl Record {
    /// Create an unsaved record from local properties.
    ///
    /// An `"id"` entry in `properties` is dropped: ids are minted by the
    /// server, not the client.
    pub fn new(mut properties: Properties) -> Self {
        properties.remove(ID_PROPERTY);
        Self {
            properties,
            id: None,
        }
    }

    /// Build a record from a server payload.
    pub fn from_value(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(mut properties) => {
                let id = properties
                    .remove(ID_PROPERTY)
                    .as_ref()
                    .and_then(ModelId::from_value);
                Ok(Self { properties, id })
            }
            other => Err(AppError::invalid_response(format!(
                "Expected a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// The server-assigned id, if the record has been saved.
    pub fn id(&self) -> Option<&ModelId> {
        self.id.as_ref()
    }

    /// Assign the id minted by the server.
    ///
    /// Returns `false` and keeps the current id when one is already set.
    pub fn assign_id(&mut self, id: ModelId) -> bool {
        match &self.id {
            None => {
                self.id = Some(id);
                true
            }
            Some(current) => {
                if *current != id {
                    warn!(%current, ignored = %id, "Ignoring attempt to change a model id");
                }
                false
            }
        }
    }

    /// Serialize the record for the wire: properties plus `"id"` when set.
    pub fn to_dictionary(&self) -> Properties {
        let mut dict = self.properties.clone();
        if let Some(id) = &self.id {
            dict.insert(ID_PROPERTY.to_string(), id.to_value());
        }
        dict
    }

    /// All properties except the id.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Consume the record, returning its properties without the id.
    pub fn into_properties(self) -> Properties {
        self.properties
    }

    /// Get a raw property value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Get a string property.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get an integer property.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Get a floating point property.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Get a boolean property.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Set a property, returning the previous value.
    ///
    /// Setting `"id"` is rejected; use [`Record::assign_id`].
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> AppResult<Option<Value>> {
        let key = key.into();
        if key == ID_PROPERTY {
            return Err(AppError::validation("The id property is assigned by the server"));
        }
        Ok(self.properties.insert(key, value.into()))
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    /// Project the record (including its id) into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> AppResult<T> {
        Ok(serde_json::from_value(Value::Object(self.to_dictionary()))?)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
