//! Configuration module
//!
//! Environment-driven configuration for the upload pipeline: database connection
//! settings plus the intake and batch limits.

use std::env;

// Common constants
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 10;
const MAX_PRODUCTS_PER_UPLOAD: usize = 1000;
const FALLBACK_FILENAME: &str = "bulk_upload.json";
const BYTES_PER_MB: usize = 1024 * 1024;

/// Limits and defaults consumed by the intake and batch stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineLimits {
    pub max_file_size_bytes: usize,
    pub max_products: usize,
    /// Display name used when the client supplied no filename
    pub fallback_filename: String,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_UPLOAD_SIZE_MB * BYTES_PER_MB,
            max_products: MAX_PRODUCTS_PER_UPLOAD,
            fallback_filename: FALLBACK_FILENAME.to_string(),
        }
    }
}

fn max_upload_size_bytes(mb: usize) -> Result<usize, anyhow::Error> {
    if mb == 0 || mb > MAX_UPLOAD_SIZE_MB {
        return Err(anyhow::anyhow!(
            "MAX_UPLOAD_SIZE_MB must be between 1 and {}",
            MAX_UPLOAD_SIZE_MB
        ));
    }
    Ok(mb * BYTES_PER_MB)
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub limits: PipelineLimits,
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be a valid number"))?;
        let max_file_size_bytes = max_upload_size_bytes(max_upload_size_mb)?;

        let max_products = env::var("MAX_PRODUCTS_PER_UPLOAD")
            .unwrap_or_else(|_| MAX_PRODUCTS_PER_UPLOAD.to_string())
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("MAX_PRODUCTS_PER_UPLOAD must be a valid number"))?;

        let config = UploadConfig {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            limits: PipelineLimits {
                max_file_size_bytes,
                max_products,
                fallback_filename: env::var("UPLOAD_FALLBACK_FILENAME")
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| FALLBACK_FILENAME.to_string()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }

        let max_bytes = MAX_UPLOAD_SIZE_MB * BYTES_PER_MB;
        if self.limits.max_file_size_bytes == 0 || self.limits.max_file_size_bytes > max_bytes {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_MB must be between 1 and {}",
                MAX_UPLOAD_SIZE_MB
            ));
        }

        if self.limits.max_products == 0 || self.limits.max_products > MAX_PRODUCTS_PER_UPLOAD {
            return Err(anyhow::anyhow!(
                "MAX_PRODUCTS_PER_UPLOAD must be between 1 and {}",
                MAX_PRODUCTS_PER_UPLOAD
            ));
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.db_timeout_seconds
    }
}
