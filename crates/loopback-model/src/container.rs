//! Storage containers: the named scopes files are grouped under.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use loopback_core::contract::{RouteTemplate, Verb};
use loopback_core::error::AppError;
use loopback_core::result::AppResult;
use loopback_core::traits::adapter::Adapter;
use loopback_core::traits::repository::Repository;
use loopback_core::types::record::Properties;

use crate::repository::{ModelRepository, expect_array, params};

/// Remote class name of the storage component.
pub const CONTAINERS_CLASS: &str = "containers";

/// Container routes.
pub mod routes {
    use super::*;

    /// `GET /containers`
    pub const ALL: RouteTemplate = RouteTemplate::new(Verb::Get, "/");
    /// `POST /containers`
    pub const CREATE: RouteTemplate = RouteTemplate::new(Verb::Post, "/");
    /// `GET /containers/:container`
    pub const GET: RouteTemplate = RouteTemplate::new(Verb::Get, "/:container");
    /// `DELETE /containers/:container`
    pub const DESTROY: RouteTemplate = RouteTemplate::new(Verb::Delete, "/:container");
}

/// A named container on the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    name: String,
    properties: Properties,
}

impl Container {
    /// Refer to a container by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Properties::new(),
        }
    }

    /// Build a container from a server payload such as
    /// `{"name": "uploads", "size": 4096, "mtime": "..."}`.
    pub fn from_value(value: Value) -> AppResult<Self> {
        let Value::Object(mut properties) = value else {
            return Err(AppError::invalid_response("Container payload is not an object"));
        };
        let name = match properties.remove("name") {
            Some(Value::String(name)) if !name.is_empty() => name,
            _ => return Err(AppError::invalid_response("Container payload has no name")),
        };
        Ok(Self { name, properties })
    }

    /// Container name, used in every file route.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extra properties reported by the server.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Lists, creates, and removes containers.
#[derive(Debug, Clone)]
pub struct ContainerRepository {
    base: ModelRepository,
}

impl ContainerRepository {
    /// Create a container repository on the given transport.
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            base: ModelRepository::new(CONTAINERS_CLASS, adapter),
        }
    }

    /// The underlying request router.
    pub fn base(&self) -> &ModelRepository {
        &self.base
    }

    /// Create a container with the given name.
    pub async fn create_container(&self, name: &str) -> AppResult<Container> {
        if name.is_empty() {
            return Err(AppError::validation("Container name must not be empty"));
        }
        let value = self
            .base
            .invoke(&routes::CREATE, &Properties::new(), Some(json!({ "name": name })))
            .await?;
        info!(container = name, "Created container");
        match value {
            Value::Object(_) => Container::from_value(value),
            _ => Ok(Container::new(name)),
        }
    }

    /// Fetch one container by name.
    pub async fn get_container(&self, name: &str) -> AppResult<Container> {
        let value = self
            .base
            .invoke(&routes::GET, &params([("container", json!(name))]), None)
            .await?;
        Container::from_value(value)
    }

    /// Fetch every container, in server order.
    pub async fn all_containers(&self) -> AppResult<Vec<Container>> {
        let value = self.base.invoke(&routes::ALL, &Properties::new(), None).await?;
        expect_array(value, "containers")?
            .into_iter()
            .map(Container::from_value)
            .collect()
    }

    /// Remove a container and every file in it.
    pub async fn destroy_container(&self, container: &Container) -> AppResult<()> {
        self.base
            .invoke(
                &routes::DESTROY,
                &params([("container", json!(container.name()))]),
                None,
            )
            .await?;
        info!(container = container.name(), "Destroyed container");
        Ok(())
    }
}

#[async_trait]
impl Repository<Container, str> for ContainerRepository {
    async fn find_by_id(&self, name: &str) -> AppResult<Container> {
        self.get_container(name).await
    }

    async fn all(&self) -> AppResult<Vec<Container>> {
        self.all_containers().await
    }
}
