//! Nutrack CLI: bulk product uploads against the nutrack database.
//!
//! Reads DATABASE_URL and the upload limits from the environment (or `.env`).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nutrack_cli::{
    build_service, content_type_for, error_json, init_tracing, print_uploads_table,
};
use nutrack_core::{AppError, UploadConfig};
use nutrack_services::{ProductUploadService, UploadFile};
use serde::Serialize;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "nutrack", about = "Nutrack bulk product upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a JSON file of products
    Upload {
        /// Path to the JSON file
        file: PathBuf,
        /// Id of the submitting user
        #[arg(long, value_name = "UUID")]
        submitter: Uuid,
        /// Declared content type (derived from the file extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
        /// File name to record instead of the local one
        #[arg(long)]
        name: Option<String>,
    },
    /// List upload records, newest first
    List {
        /// Only uploads of this submitter
        #[arg(long, value_name = "UUID")]
        submitter: Option<Uuid>,
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Get a single upload record
    Get {
        /// Upload UUID
        id: Uuid,
    },
    /// List the products stored by an upload
    Products {
        /// Upload UUID
        id: Uuid,
    },
    /// Delete the products stored by an upload (the record is kept)
    Purge {
        /// Upload UUID
        id: Uuid,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn run(service: &ProductUploadService, command: Commands) -> anyhow::Result<Result<(), AppError>> {
    match command {
        Commands::Upload {
            file,
            submitter,
            content_type,
            name,
        } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let filename = match name {
                Some(name) => Some(name),
                None => file.file_name().map(|n| n.to_string_lossy().into_owned()),
            };
            let content_type =
                content_type.unwrap_or_else(|| content_type_for(&file).to_string());

            let upload = UploadFile {
                data: Some(data.as_slice()),
                filename: filename.as_deref(),
                content_type: Some(content_type.as_str()),
            };
            match service.submit_bulk_upload(upload, submitter).await {
                Ok(result) => print_json(&result)?,
                Err(e) => return Ok(Err(e)),
            }
        }
        Commands::List { submitter, format } => {
            let uploads = match submitter {
                Some(submitter) => service.list_uploads_by_submitter(submitter).await,
                None => service.list_all_uploads().await,
            };
            let uploads = match uploads {
                Ok(uploads) => uploads,
                Err(e) => return Ok(Err(e)),
            };
            match format.as_str() {
                "json" => print_json(&uploads)?,
                _ => print_uploads_table(&uploads),
            }
        }
        Commands::Get { id } => match service.get_upload_by_id(id).await {
            Ok(upload) => print_json(&upload)?,
            Err(e) => return Ok(Err(e)),
        },
        Commands::Products { id } => match service.list_products_by_upload(id).await {
            Ok(products) => print_json(&products)?,
            Err(e) => return Ok(Err(e)),
        },
        Commands::Purge { id } => match service.delete_products_by_upload_id(id).await {
            Ok(deleted) => print_json(&serde_json::json!({
                "upload_id": id,
                "deleted_products": deleted,
            }))?,
            Err(e) => return Ok(Err(e)),
        },
    }
    Ok(Ok(()))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let config = UploadConfig::from_env().context("Invalid configuration")?;
    let service = build_service(&config).await?;

    match run(&service, cli.command).await? {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::debug!(error = %e.detailed_message(), "Command failed");
            eprintln!("{}", serde_json::to_string_pretty(&error_json(&e))?);
            Ok(ExitCode::FAILURE)
        }
    }
}
