//! # loopback
//!
//! Client SDK for LoopBack REST APIs: persisted models addressed by class
//! name, and binary files grouped in storage containers.
//!
//! ```no_run
//! use loopback::prelude::*;
//!
//! # async fn run() -> AppResult<()> {
//! let registry = loopback::connect(&ClientConfig::default())?;
//!
//! let widgets = registry.persisted("widgets");
//! let mut widget = widgets.model(Properties::new());
//! widget.set("name", "gear")?;
//! widget.save().await?;
//!
//! let uploads = registry.files(&Container::new("uploads"));
//! let file = uploads.upload_bytes("greeting.txt", &b"hello"[..], "text/plain").await?;
//! let bytes = file.download_bytes().await?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::info;

pub use loopback_core::config::{ClientConfig, LoggingConfig, RestConfig};
pub use loopback_core::error::{AppError, ErrorKind};
pub use loopback_core::result::AppResult;
pub use loopback_core::types::id::ModelId;
pub use loopback_core::types::record::{Properties, Record};
pub use loopback_core::{contract, traits};
pub use loopback_model::{
    Container, ContainerRepository, File, FileRepository, PersistedModel,
    PersistedModelRepository, PersistedState, RepositoryRegistry, dispatch,
};
pub use loopback_rest::RestAdapter;

/// Common imports for SDK users.
pub mod prelude {
    pub use crate::{
        AppError, AppResult, ClientConfig, Container, ErrorKind, File, ModelId,
        PersistedModel, Properties, RepositoryRegistry,
    };
    pub use loopback_core::traits::{FileTransferable, Persistable, Repository};
}

/// Build a registry backed by the REST transport described by `config`.
pub fn connect(config: &ClientConfig) -> AppResult<RepositoryRegistry> {
    let adapter = RestAdapter::new(&config.rest)?;
    info!(base_url = %adapter.base_url(), "Connected LoopBack client");
    Ok(RepositoryRegistry::new(Arc::new(adapter)))
}
