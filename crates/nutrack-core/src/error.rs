//! Error types module
//!
//! This module provides the core error types used throughout the upload pipeline.
//! Every rejection the pipeline can produce is a distinct `AppError` variant so callers
//! can tell an intake problem from a batch problem from a store conflict without
//! parsing messages.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected uploads and conflicts
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PARSE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Raw upload constraints violated (empty, oversized, wrong type or extension)
    #[error("Invalid upload: {0}")]
    Intake(String),

    /// Upload body is not a JSON array of product objects
    #[error("Malformed JSON: {0}")]
    Parse(String),

    /// Batch is empty or above the entry limit
    #[error("Invalid batch size: {0}")]
    BatchSize(String),

    #[error("Product at index {index} is invalid: {}", .errors.join("; "))]
    FieldValidation { index: usize, errors: Vec<String> },

    #[error("Duplicate EAN codes in upload: {}", .codes.join(", "))]
    DuplicateInFile { codes: Vec<String> },

    #[error("All {} products already exist; nothing to upload: {}", .codes.len(), .codes.join(", "))]
    AllDuplicatesConflict { codes: Vec<String> },

    /// Failure while writing accepted products. The upload record is FAILED by the time
    /// the caller sees this.
    #[error("Failed to store products: {0}")]
    PersistenceFailure(String),

    #[error("Upload record cannot move from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Intake(_) => (
            400,
            "INTAKE_ERROR",
            false,
            Some("Upload a non-empty .json file of at most 10 MB"),
            false,
            LogLevel::Debug,
        ),
        AppError::Parse(_) => (
            400,
            "PARSE_ERROR",
            false,
            Some("Send a JSON array of product objects"),
            false,
            LogLevel::Debug,
        ),
        AppError::BatchSize(_) => (
            400,
            "BATCH_SIZE_ERROR",
            false,
            Some("Send between 1 and 1000 products per upload"),
            false,
            LogLevel::Debug,
        ),
        AppError::FieldValidation { .. } => (
            422,
            "FIELD_VALIDATION_ERROR",
            false,
            Some("Fix the reported product fields and upload again"),
            false,
            LogLevel::Debug,
        ),
        AppError::DuplicateInFile { .. } => (
            422,
            "DUPLICATE_IN_FILE",
            false,
            Some("Remove repeated EAN codes from the file"),
            false,
            LogLevel::Debug,
        ),
        AppError::AllDuplicatesConflict { .. } => (
            409,
            "ALL_DUPLICATES_CONFLICT",
            false,
            Some("Every product in the file is already stored"),
            false,
            LogLevel::Warn,
        ),
        AppError::PersistenceFailure(_) => (
            500,
            "PERSISTENCE_FAILURE",
            true,
            Some("Upload the file again; nothing from the failed attempt was kept"),
            false,
            LogLevel::Error,
        ),
        AppError::InvalidStateTransition { .. } => (
            409,
            "INVALID_STATE_TRANSITION",
            false,
            None,
            false,
            LogLevel::Error,
        ),
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Intake(_) => "IntakeError",
            AppError::Parse(_) => "ParseError",
            AppError::BatchSize(_) => "BatchSizeError",
            AppError::FieldValidation { .. } => "FieldValidationError",
            AppError::DuplicateInFile { .. } => "DuplicateInFileError",
            AppError::AllDuplicatesConflict { .. } => "AllDuplicatesConflictError",
            AppError::PersistenceFailure(_) => "PersistenceFailure",
            AppError::InvalidStateTransition { .. } => "InvalidStateTransition",
            AppError::Database(_) => "Database",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            // Pipeline rejections must locate the offending index/field/code on their own
            other => other.to_string(),
        }
    }
}
