//! One repository per model class or container, shared by the application.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use loopback_core::traits::adapter::Adapter;

use crate::container::{Container, ContainerRepository};
use crate::file::FileRepository;
use crate::persisted::PersistedModelRepository;

/// Registry of repositories bound to one transport.
///
/// Repositories are created on first use and the same instance is returned
/// for the same key afterwards. Clones share the underlying maps, so the
/// registry can be handed to every part of an application that needs it.
#[derive(Debug, Clone)]
pub struct RepositoryRegistry {
    adapter: Arc<dyn Adapter>,
    models: Arc<DashMap<String, PersistedModelRepository>>,
    files: Arc<DashMap<String, FileRepository>>,
    containers: ContainerRepository,
}

impl RepositoryRegistry {
    /// Create an empty registry on the given transport.
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            containers: ContainerRepository::new(adapter.clone()),
            adapter,
            models: Arc::new(DashMap::new()),
            files: Arc::new(DashMap::new()),
        }
    }

    /// The transport all repositories share.
    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.adapter
    }

    /// The repository for a persisted model class.
    pub fn persisted(&self, class_name: &str) -> PersistedModelRepository {
        if let Some(existing) = self.models.get(class_name) {
            return existing.clone();
        }
        self.models
            .entry(class_name.to_string())
            .or_insert_with(|| {
                debug!(class = class_name, "Registering model repository");
                PersistedModelRepository::new(class_name, self.adapter.clone())
            })
            .clone()
    }

    /// The file repository scoped to `container`.
    pub fn files(&self, container: &Container) -> FileRepository {
        if let Some(existing) = self.files.get(container.name()) {
            return existing.clone();
        }
        self.files
            .entry(container.name().to_string())
            .or_insert_with(|| {
                debug!(container = container.name(), "Registering file repository");
                FileRepository::new(container.clone(), self.adapter.clone())
            })
            .clone()
    }

    /// The container repository.
    pub fn containers(&self) -> ContainerRepository {
        self.containers.clone()
    }

    /// Number of model classes registered so far.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}
