//! Persisted model CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use loopback_core::error::AppError;
use loopback_core::traits::Persistable;
use loopback_core::types::id::ModelId;
use loopback_core::types::record::Properties;
use loopback_model::{PersistedModel, RepositoryRegistry};

/// Arguments for model commands
#[derive(Debug, Args)]
pub struct ModelArgs {
    /// Model subcommand
    #[command(subcommand)]
    pub command: ModelCommand,
}

/// Model subcommands
#[derive(Debug, Subcommand)]
pub enum ModelCommand {
    /// Fetch one record by id
    Find {
        /// Remote class name, e.g. widgets
        class: String,
        /// Record id
        id: String,
    },
    /// List every record of a class
    All {
        /// Remote class name
        class: String,
    },
    /// Fetch the first record matching a filter
    FindOne {
        /// Remote class name
        class: String,
        /// LoopBack filter as JSON, e.g. '{"where":{"name":"gear"}}'
        #[arg(long)]
        filter: String,
    },
    /// Check whether a record exists
    Exists {
        /// Remote class name
        class: String,
        /// Record id
        id: String,
    },
    /// Create a record
    Create {
        /// Remote class name
        class: String,
        /// Properties as a JSON object
        #[arg(short, long)]
        data: String,
    },
    /// Update properties of an existing record
    Update {
        /// Remote class name
        class: String,
        /// Record id
        id: String,
        /// Properties to set, as a JSON object
        #[arg(short, long)]
        data: String,
    },
    /// Delete a record
    Delete {
        /// Remote class name
        class: String,
        /// Record id
        id: String,
    },
}

/// Model display row
#[derive(Debug, Serialize, Tabled)]
struct ModelRow {
    /// Record id
    id: String,
    /// Remaining properties
    properties: String,
}

impl From<&PersistedModel> for ModelRow {
    fn from(model: &PersistedModel) -> Self {
        Self {
            id: model.id().map(ToString::to_string).unwrap_or_default(),
            properties: Value::Object(model.record().properties().clone()).to_string(),
        }
    }
}

/// Execute model commands
pub async fn execute(
    args: &ModelArgs,
    registry: &RepositoryRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ModelCommand::Find { class, id } => {
            let model = registry.persisted(class).find_by_id(&parse_id(id)).await?;
            print_model(&model, format);
        }
        ModelCommand::All { class } => {
            let models = registry.persisted(class).all().await?;
            let rows: Vec<ModelRow> = models.iter().map(ModelRow::from).collect();
            output::print_list(&rows, format);
        }
        ModelCommand::FindOne { class, filter } => {
            let filter: Value = serde_json::from_str(filter)
                .map_err(|e| AppError::validation(format!("Invalid filter JSON: {e}")))?;
            let model = registry.persisted(class).find_one(&filter).await?;
            print_model(&model, format);
        }
        ModelCommand::Exists { class, id } => {
            let exists = registry.persisted(class).exists(&parse_id(id)).await?;
            output::print_value(&serde_json::json!({ "exists": exists }), format);
        }
        ModelCommand::Create { class, data } => {
            let mut model = registry.persisted(class).model(parse_properties(data)?);
            model.save().await?;
            print_model(&model, format);
        }
        ModelCommand::Update { class, id, data } => {
            let mut model = registry.persisted(class).find_by_id(&parse_id(id)).await?;
            for (key, value) in parse_properties(data)? {
                model.set(key, value)?;
            }
            model.save().await?;
            print_model(&model, format);
        }
        ModelCommand::Delete { class, id } => {
            let id = parse_id(id);
            let mut model = registry
                .persisted(class)
                .model_from_value(serde_json::json!({ "id": id.to_value() }))?;
            model.destroy().await?;
            output::print_success(&format!("Deleted {class} {id}"));
        }
    }
    Ok(())
}

fn print_model(model: &PersistedModel, format: OutputFormat) {
    output::print_value(&Value::Object(model.to_dictionary()), format);
}

/// Numeric ids are sent as numbers, anything else as text.
fn parse_id(raw: &str) -> ModelId {
    raw.parse::<i64>()
        .map(ModelId::Number)
        .unwrap_or_else(|_| ModelId::Text(raw.to_string()))
}

fn parse_properties(raw: &str) -> Result<Properties, AppError> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(properties)) => Ok(properties),
        Ok(_) => Err(AppError::validation("--data must be a JSON object")),
        Err(e) => Err(AppError::validation(format!("Invalid --data JSON: {e}"))),
    }
}
