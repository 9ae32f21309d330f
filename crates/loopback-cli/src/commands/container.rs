//! Storage container CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use loopback_core::error::AppError;
use loopback_model::{Container, RepositoryRegistry};

/// Arguments for container commands
#[derive(Debug, Args)]
pub struct ContainerArgs {
    /// Container subcommand
    #[command(subcommand)]
    pub command: ContainerCommand,
}

/// Container subcommands
#[derive(Debug, Subcommand)]
pub enum ContainerCommand {
    /// List all containers
    List,
    /// Show one container
    Get {
        /// Container name
        name: String,
    },
    /// Create a container
    Create {
        /// Container name
        name: String,
    },
    /// Delete a container and every file in it
    Delete {
        /// Container name
        name: String,
    },
}

/// Container display row
#[derive(Debug, Serialize, Tabled)]
struct ContainerRow {
    /// Container name
    name: String,
    /// Size reported by the server
    size: String,
}

impl From<&Container> for ContainerRow {
    fn from(container: &Container) -> Self {
        Self {
            name: container.name().to_string(),
            size: container
                .properties()
                .get("size")
                .and_then(|v| v.as_u64())
                .map(output::format_bytes)
                .unwrap_or_default(),
        }
    }
}

/// Execute container commands
pub async fn execute(
    args: &ContainerArgs,
    registry: &RepositoryRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    let containers = registry.containers();

    match &args.command {
        ContainerCommand::List => {
            let rows: Vec<ContainerRow> = containers
                .all_containers()
                .await?
                .iter()
                .map(ContainerRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        ContainerCommand::Get { name } => {
            let container = containers.get_container(name).await?;
            output::print_list(&[ContainerRow::from(&container)], format);
        }
        ContainerCommand::Create { name } => {
            let container = containers.create_container(name).await?;
            output::print_success(&format!("Container '{}' created", container.name()));
        }
        ContainerCommand::Delete { name } => {
            containers.destroy_container(&Container::new(name.as_str())).await?;
            output::print_success(&format!("Container '{name}' deleted"));
        }
    }
    Ok(())
}
