use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use nutrack_core::models::UploadSummary;
use nutrack_core::{AppError, ErrorMetadata, UploadConfig};
use nutrack_db::{setup_database, ProductRepository, ProductUploadRepository, UserDirectory};
use nutrack_services::ProductUploadService;
use serde_json::{json, Value};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for CLI binaries. `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Connect to the database and wire the upload service to the Postgres repositories.
pub async fn build_service(config: &UploadConfig) -> Result<ProductUploadService> {
    let pool = setup_database(config).await?;

    Ok(ProductUploadService::new(
        Arc::new(ProductRepository::new(pool.clone())),
        Arc::new(ProductUploadRepository::new(pool.clone())),
        Arc::new(UserDirectory::new(pool)),
        config.limits.clone(),
    ))
}

/// Content type declared for a local file: JSON for `.json`, opaque bytes otherwise.
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Error body printed when a command fails with an [`AppError`].
pub fn error_json(err: &AppError) -> Value {
    let mut body = json!({
        "error": err.client_message(),
        "error_type": err.error_type(),
        "code": err.error_code(),
        "recoverable": err.is_recoverable(),
    });
    if let Some(action) = err.suggested_action() {
        body["suggested_action"] = json!(action);
    }
    body
}

pub fn print_uploads_table(uploads: &[UploadSummary]) {
    if uploads.is_empty() {
        println!("No uploads found.");
        return;
    }

    println!(
        "{:<36} {:<24} {:>8} {:<20} {:<10} {:>19}",
        "ID", "File", "Products", "Submitted By", "Status", "Submitted At"
    );
    println!("{}", "-".repeat(122));

    for upload in uploads {
        println!(
            "{:<36} {:<24} {:>8} {:<20} {:<10} {:>19}",
            upload.id,
            truncate_string(&upload.file_name, 24),
            upload.product_count,
            truncate_string(&upload.submitted_by, 20),
            upload.status,
            upload.submitted_at.format("%Y-%m-%d %H:%M:%S")
        );
        if let Some(message) = &upload.message {
            println!("    {}", message);
        }
    }

    println!("\nTotal: {} uploads", uploads.len());
}
