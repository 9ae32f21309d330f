//! File CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tokio::io::AsyncWriteExt;

use crate::output::{self, OutputFormat};
use loopback_core::error::AppError;
use loopback_core::traits::FileTransferable;
use loopback_model::transfer;
use loopback_model::{Container, File, RepositoryRegistry};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Upload a local file into a container
    Upload {
        /// Container name
        container: String,
        /// Path to the file to upload
        path: PathBuf,
        /// Override the stored file name
        #[arg(short, long)]
        name: Option<String>,
        /// Override the inferred content type
        #[arg(short = 't', long)]
        content_type: Option<String>,
    },
    /// Download a file; writes to stdout without --output
    Download {
        /// Container name
        container: String,
        /// File name
        name: String,
        /// Target path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the metadata of one file
    Get {
        /// Container name
        container: String,
        /// File name
        name: String,
    },
    /// List the files in a container
    List {
        /// Container name
        container: String,
    },
    /// Delete a file
    Delete {
        /// Container name
        container: String,
        /// File name
        name: String,
    },
}

/// File display row
#[derive(Debug, Serialize, Tabled)]
struct FileRow {
    /// File name
    name: String,
    /// Content type
    #[tabled(rename = "type")]
    content_type: String,
    /// Size
    size: String,
    /// Last modified
    modified: String,
}

impl From<&File> for FileRow {
    fn from(file: &File) -> Self {
        Self {
            name: file.name().to_string(),
            content_type: file.content_type().unwrap_or_default().to_string(),
            size: file.size().map(output::format_bytes).unwrap_or_default(),
            modified: file
                .modified_at()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Execute file commands
pub async fn execute(
    args: &FileArgs,
    registry: &RepositoryRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        FileCommand::Upload {
            container,
            path,
            name,
            content_type,
        } => {
            let repo = registry.files(&Container::new(container.as_str()));
            let local = transfer::open_local(path).await?;
            let name = name.clone().unwrap_or(local.name);
            let content_type = content_type.clone().unwrap_or(local.content_type);
            let file = repo.upload_source(&name, &content_type, local.source).await?;
            output::print_success(&format!(
                "Uploaded '{}' to container '{}'",
                file.name(),
                file.container().name()
            ));
        }
        FileCommand::Download {
            container,
            name,
            output: target,
        } => {
            let file = registry
                .files(&Container::new(container.as_str()))
                .file(name.as_str());
            match target {
                Some(path) => {
                    let bytes = file.download_to_path(path).await?;
                    output::print_success(&format!(
                        "Downloaded '{}' ({}) to {}",
                        name,
                        output::format_bytes(bytes),
                        path.display()
                    ));
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    file.download_to_writer(&mut stdout).await?;
                    stdout.flush().await?;
                }
            }
        }
        FileCommand::Get { container, name } => {
            let file = registry
                .files(&Container::new(container.as_str()))
                .get_file(name)
                .await?;
            output::print_list(&[FileRow::from(&file)], format);
        }
        FileCommand::List { container } => {
            let files = registry
                .files(&Container::new(container.as_str()))
                .all_files()
                .await?;
            let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
            output::print_list(&rows, format);
        }
        FileCommand::Delete { container, name } => {
            let mut file = registry
                .files(&Container::new(container.as_str()))
                .file(name.as_str());
            file.delete().await?;
            output::print_success(&format!("Deleted '{name}' from container '{container}'"));
        }
    }
    Ok(())
}
