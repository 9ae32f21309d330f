//! # loopback-model
//!
//! Local representatives of server-hosted data. A
//! [`PersistedModelRepository`] finds and creates [`PersistedModel`]
//! instances; a [`FileRepository`] scoped to one [`Container`] uploads and
//! enumerates [`File`]s. Repositories are handed out by a
//! [`RepositoryRegistry`], which keeps exactly one repository per model type
//! or container.

pub mod completion;
pub mod container;
pub mod file;
pub mod persisted;
pub mod registry;
pub mod repository;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testing;

pub use completion::dispatch;
pub use container::{Container, ContainerRepository};
pub use file::{File, FileRepository};
pub use persisted::{PersistedModel, PersistedModelRepository, PersistedState};
pub use registry::RepositoryRegistry;
pub use repository::ModelRepository;
