//! Persisted models: generic CRUD over one remote class.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use loopback_core::contract::{RouteTemplate, Verb};
use loopback_core::error::AppError;
use loopback_core::result::AppResult;
use loopback_core::traits::adapter::Adapter;
use loopback_core::traits::persistable::Persistable;
use loopback_core::traits::repository::Repository;
use loopback_core::types::id::ModelId;
use loopback_core::types::record::{Properties, Record};

use crate::repository::{ModelRepository, expect_array, params};

/// Persisted model routes, relative to the class name.
pub mod routes {
    use super::*;

    /// `POST /{class}`
    pub const CREATE: RouteTemplate = RouteTemplate::new(Verb::Post, "/");
    /// `PUT /{class}/:id`
    pub const SAVE: RouteTemplate = RouteTemplate::new(Verb::Put, "/:id");
    /// `DELETE /{class}/:id`
    pub const REMOVE: RouteTemplate = RouteTemplate::new(Verb::Delete, "/:id");
    /// `GET /{class}/:id`
    pub const FIND_BY_ID: RouteTemplate = RouteTemplate::new(Verb::Get, "/:id");
    /// `GET /{class}`
    pub const ALL: RouteTemplate = RouteTemplate::new(Verb::Get, "/");
    /// `GET /{class}/:id/exists`
    pub const EXISTS: RouteTemplate = RouteTemplate::new(Verb::Get, "/:id/exists");
    /// `GET /{class}/findOne`
    pub const FIND_ONE: RouteTemplate = RouteTemplate::new(Verb::Get, "/findOne");
}

/// Lifecycle state of a [`PersistedModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistedState {
    /// Local only; the server has not assigned an id.
    Unsaved,
    /// Mirrors a live server record.
    Saved,
    /// The server record was destroyed through this instance.
    Destroyed,
}

/// A local instance of one server record.
#[derive(Debug, Clone)]
pub struct PersistedModel {
    record: Record,
    destroyed: bool,
    repository: PersistedModelRepository,
}

impl PersistedModel {
    /// Current lifecycle state.
    pub fn state(&self) -> PersistedState {
        match (self.destroyed, self.record.id()) {
            (true, _) => PersistedState::Destroyed,
            (false, Some(_)) => PersistedState::Saved,
            (false, None) => PersistedState::Unsaved,
        }
    }

    /// The repository this instance was created by.
    pub fn repository(&self) -> &PersistedModelRepository {
        &self.repository
    }

    /// The underlying property bag.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Get a raw property value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    /// Get a string property.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.record.get_str(key)
    }

    /// Get an integer property.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.record.get_i64(key)
    }

    /// Set a property locally. Takes effect on the server at the next save.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> AppResult<Option<Value>> {
        self.record.set(key, value)
    }

    /// Remove a property locally.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.record.remove(key)
    }

    /// What `save` would send: properties plus `"id"` when assigned.
    pub fn to_dictionary(&self) -> Properties {
        self.record.to_dictionary()
    }

    /// Project the instance into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> AppResult<T> {
        self.record.deserialize()
    }

    /// A new unsaved instance carrying this instance's properties.
    ///
    /// Saving it creates a new server record with a new id. This is the way
    /// to recreate a destroyed record.
    pub fn into_unsaved(self) -> PersistedModel {
        PersistedModel {
            record: Record::new(self.record.into_properties()),
            destroyed: false,
            repository: self.repository,
        }
    }

    fn ensure_live(&self, operation: &str) -> AppResult<()> {
        if self.destroyed {
            return Err(AppError::validation(format!(
                "Cannot {operation} a destroyed {} instance",
                self.repository.class_name()
            )));
        }
        Ok(())
    }

    fn id_params(id: &ModelId) -> Properties {
        params([("id", id.to_value())])
    }
}

#[async_trait]
impl Persistable for PersistedModel {
    fn id(&self) -> Option<&ModelId> {
        self.record.id()
    }

    async fn save(&mut self) -> AppResult<()> {
        self.ensure_live("save")?;
        let body = Value::Object(self.record.to_dictionary());
        let base = &self.repository.base;

        match self.record.id().cloned() {
            None => {
                let response = base.invoke(&routes::CREATE, &Properties::new(), Some(body)).await?;
                let id = response
                    .get("id")
                    .and_then(ModelId::from_value)
                    .ok_or_else(|| {
                        AppError::invalid_response(format!(
                            "Create response for {} carried no id",
                            base.class_name()
                        ))
                    })?;
                info!(class = base.class_name(), %id, "Created model");
                self.record.assign_id(id);
            }
            Some(id) => {
                let response = base
                    .invoke(&routes::SAVE, &Self::id_params(&id), Some(body))
                    .await?;
                if let Some(returned) = response.get("id").and_then(ModelId::from_value) {
                    self.record.assign_id(returned);
                }
                debug!(class = base.class_name(), %id, "Updated model");
            }
        }
        Ok(())
    }

    async fn destroy(&mut self) -> AppResult<()> {
        self.ensure_live("destroy")?;
        let base = &self.repository.base;
        let id = self.record.id().cloned().ok_or_else(|| {
            AppError::validation(format!(
                "Cannot destroy an unsaved {} instance",
                base.class_name()
            ))
        })?;

        base.invoke(&routes::REMOVE, &Self::id_params(&id), None).await?;
        info!(class = base.class_name(), %id, "Destroyed model");
        self.destroyed = true;
        Ok(())
    }
}

/// Type-level operations for one remote class of persisted models.
#[derive(Debug, Clone)]
pub struct PersistedModelRepository {
    base: ModelRepository,
}

impl PersistedModelRepository {
    /// Create a repository for the given class name (e.g. `"widgets"`).
    ///
    /// Applications normally obtain repositories from a
    /// [`RepositoryRegistry`](crate::RepositoryRegistry) instead.
    pub fn new(class_name: impl Into<String>, adapter: Arc<dyn Adapter>) -> Self {
        Self {
            base: ModelRepository::new(class_name, adapter),
        }
    }

    /// The remote class name.
    pub fn class_name(&self) -> &str {
        self.base.class_name()
    }

    /// The underlying request router.
    pub fn base(&self) -> &ModelRepository {
        &self.base
    }

    /// Whether two handles refer to the same repository instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.base.ptr_eq(&other.base)
    }

    /// A new unsaved instance with the given properties.
    pub fn model(&self, properties: Properties) -> PersistedModel {
        PersistedModel {
            record: Record::new(properties),
            destroyed: false,
            repository: self.clone(),
        }
    }

    /// Build an instance from a server payload.
    pub fn model_from_value(&self, value: Value) -> AppResult<PersistedModel> {
        Ok(PersistedModel {
            record: Record::from_value(value)?,
            destroyed: false,
            repository: self.clone(),
        })
    }

    /// Fetch one record by id.
    pub async fn find_by_id(&self, id: &ModelId) -> AppResult<PersistedModel> {
        let value = self
            .base
            .invoke(&routes::FIND_BY_ID, &PersistedModel::id_params(id), None)
            .await?;
        if value.is_null() {
            return Err(AppError::invalid_response(format!(
                "Empty response for {} id {id}",
                self.class_name()
            )));
        }
        self.model_from_value(value)
    }

    /// Fetch every record, in server order.
    pub async fn all(&self) -> AppResult<Vec<PersistedModel>> {
        let value = self.base.invoke(&routes::ALL, &Properties::new(), None).await?;
        expect_array(value, self.class_name())?
            .into_iter()
            .map(|item| self.model_from_value(item))
            .collect()
    }

    /// Whether a record with the given id exists.
    pub async fn exists(&self, id: &ModelId) -> AppResult<bool> {
        let value = self
            .base
            .invoke(&routes::EXISTS, &PersistedModel::id_params(id), None)
            .await?;
        value
            .get("exists")
            .and_then(Value::as_bool)
            .ok_or_else(|| AppError::invalid_response("Exists response has no 'exists' flag"))
    }

    /// Fetch the first record matching a LoopBack filter, e.g.
    /// `{"where": {"name": "gear"}}`.
    pub async fn find_one(&self, filter: &Value) -> AppResult<PersistedModel> {
        let request = self
            .base
            .request(&routes::FIND_ONE, &Properties::new())?
            .with_query("filter", serde_json::to_string(filter)?);
        let value = self.base.send(request).await?;
        if value.is_null() {
            return Err(AppError::not_found(format!(
                "No {} matches the filter",
                self.class_name()
            )));
        }
        self.model_from_value(value)
    }
}

#[async_trait]
impl Repository<PersistedModel, ModelId> for PersistedModelRepository {
    async fn find_by_id(&self, id: &ModelId) -> AppResult<PersistedModel> {
        PersistedModelRepository::find_by_id(self, id).await
    }

    async fn all(&self) -> AppResult<Vec<PersistedModel>> {
        PersistedModelRepository::all(self).await
    }
}
