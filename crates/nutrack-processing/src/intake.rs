use nutrack_core::models::RawProductEntry;
use nutrack_core::{AppError, PipelineLimits};

const JSON_CONTENT_TYPE: &str = "application/json";
const JSON_EXTENSION: &str = ".json";
const MAX_FILENAME_LENGTH: usize = 255;

/// Raw upload constraint violations
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("No file provided")]
    MissingFile,

    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type} (allowed: application/json)")]
    InvalidContentType { content_type: String },

    #[error("Invalid file extension: {filename} (expected a .json file)")]
    InvalidExtension { filename: String },

    #[error("{0}")]
    MalformedJson(String),
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::MalformedJson(msg) => AppError::Parse(msg),
            other => AppError::Intake(other.to_string()),
        }
    }
}

/// An upload that passed intake: display name plus entries in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUpload {
    pub file_name: String,
    pub entries: Vec<RawProductEntry>,
}

/// File intake stage
///
/// Checks run in a fixed order and the first violated constraint is reported:
/// presence, emptiness, size, content type, extension, then JSON parsing.
#[derive(Debug, Clone)]
pub struct FileIntake {
    max_file_size: usize,
    fallback_filename: String,
}

impl FileIntake {
    pub fn new(limits: &PipelineLimits) -> Self {
        Self {
            max_file_size: limits.max_file_size_bytes,
            fallback_filename: limits.fallback_filename.clone(),
        }
    }

    /// Run every intake check and parse the body.
    pub fn accept(
        &self,
        data: Option<&[u8]>,
        filename: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<ParsedUpload, IntakeError> {
        let data = data.ok_or(IntakeError::MissingFile)?;
        self.validate_file_size(data.len())?;
        self.validate_content_type(content_type)?;
        let file_name = self.resolve_filename(filename)?;
        let entries = parse_entries(data)?;

        tracing::debug!(
            file_name = %file_name,
            file_size = data.len(),
            entries = entries.len(),
            "Upload passed intake"
        );

        Ok(ParsedUpload { file_name, entries })
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), IntakeError> {
        if size == 0 {
            return Err(IntakeError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(IntakeError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the declared content type. Parameters such as `charset` are ignored.
    pub fn validate_content_type(&self, content_type: Option<&str>) -> Result<(), IntakeError> {
        let declared = content_type.unwrap_or_default();
        let normalized = declared
            .split(';')
            .next()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();

        if normalized != JSON_CONTENT_TYPE {
            return Err(IntakeError::InvalidContentType {
                content_type: if declared.trim().is_empty() {
                    "<none>".to_string()
                } else {
                    declared.to_string()
                },
            });
        }

        Ok(())
    }

    /// Validate the extension of a supplied filename and return the display name.
    /// Without a filename the fallback name is used.
    pub fn resolve_filename(&self, filename: Option<&str>) -> Result<String, IntakeError> {
        let filename = match filename.map(str::trim).filter(|f| !f.is_empty()) {
            Some(filename) => filename,
            None => return Ok(self.fallback_filename.clone()),
        };

        if !filename.to_lowercase().ends_with(JSON_EXTENSION) {
            return Err(IntakeError::InvalidExtension {
                filename: filename.to_string(),
            });
        }

        Ok(display_filename(filename))
    }
}

/// Strip any client-side directory part and cap the length.
fn display_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    base.chars().take(MAX_FILENAME_LENGTH).collect()
}

/// Parse the body into raw entries, keeping file order.
pub fn parse_entries(data: &[u8]) -> Result<Vec<RawProductEntry>, IntakeError> {
    serde_json::from_slice::<Vec<RawProductEntry>>(data).map_err(|e| {
        IntakeError::MalformedJson(format!(
            "Upload must be a JSON array of product objects: {}",
            e
        ))
    })
}
