//! CLI command definitions and dispatch.

pub mod container;
pub mod file;
pub mod model;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use loopback_core::config::ClientConfig;
use loopback_core::error::AppError;
use loopback_model::RepositoryRegistry;
use loopback_rest::RestAdapter;

/// lb: command-line client for LoopBack REST APIs
#[derive(Debug, Parser)]
#[command(name = "lb", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file (overrides --env)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Configuration environment, loads config/default plus config/{env}
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Override the REST API base URL
    #[arg(long)]
    pub url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Persisted model operations
    Model(model::ModelArgs),
    /// File operations within a container
    File(file::FileArgs),
    /// Storage container management
    Container(container::ContainerArgs),
}

impl Cli {
    /// Load configuration from the selected source and apply overrides.
    pub fn load_config(&self) -> Result<ClientConfig, AppError> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load_file(path)?,
            None => ClientConfig::load(&self.env)?,
        };
        if let Some(url) = &self.url {
            config.rest.base_url = url.clone();
        }
        Ok(config)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: &ClientConfig) -> Result<(), AppError> {
        let registry = connect(config)?;
        match &self.command {
            Commands::Model(args) => model::execute(args, &registry, self.format).await,
            Commands::File(args) => file::execute(args, &registry, self.format).await,
            Commands::Container(args) => container::execute(args, &registry, self.format).await,
        }
    }
}

/// Helper: build a registry on the REST transport
pub fn connect(config: &ClientConfig) -> Result<RepositoryRegistry, AppError> {
    let adapter = RestAdapter::new(&config.rest)?;
    Ok(RepositoryRegistry::new(Arc::new(adapter)))
}
