use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Lifecycle of one bulk upload attempt.
///
/// `Processing` is the only initial state; `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UploadStatus {
    Processing,
    Completed,
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Processing => "PROCESSING",
            UploadStatus::Completed => "COMPLETED",
            UploadStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadStatus::Processing)
    }

    pub fn can_transition_to(&self, next: UploadStatus) -> bool {
        matches!(
            (self, next),
            (UploadStatus::Processing, UploadStatus::Completed)
                | (UploadStatus::Processing, UploadStatus::Failed)
        )
    }
}

impl Display for UploadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSING" => Ok(UploadStatus::Processing),
            "COMPLETED" => Ok(UploadStatus::Completed),
            "FAILED" => Ok(UploadStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid upload status: {}", s)),
        }
    }
}

/// Values needed to open an upload record; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUploadRecord {
    pub file_name: String,
    pub product_count: i32,
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
}

/// Audit record for one submitted batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: Uuid,
    pub file_name: String,
    /// Number of products persisted for this record
    pub product_count: i32,
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub status: UploadStatus,
    pub message: Option<String>,
}

impl UploadRecord {
    /// Build the PROCESSING record for a freshly assigned id.
    pub fn processing(id: Uuid, new: NewUploadRecord) -> Self {
        Self {
            id,
            file_name: new.file_name,
            product_count: new.product_count,
            submitted_by: new.submitted_by,
            submitted_at: new.submitted_at,
            status: UploadStatus::Processing,
            message: None,
        }
    }

    /// PROCESSING -> COMPLETED
    pub fn complete(&mut self, message: Option<String>) -> Result<(), AppError> {
        self.transition(UploadStatus::Completed)?;
        self.message = message;
        Ok(())
    }

    /// PROCESSING -> FAILED. Nothing from the failed attempt stays stored, so the
    /// product count drops to zero.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), AppError> {
        self.transition(UploadStatus::Failed)?;
        self.product_count = 0;
        self.message = Some(message.into());
        Ok(())
    }

    fn transition(&mut self, next: UploadStatus) -> Result<(), AppError> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidStateTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Upload record as shown to clients, with the submitter resolved to a display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadSummary {
    pub id: Uuid,
    pub file_name: String,
    pub product_count: i32,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadSummary {
    pub fn from_record(record: &UploadRecord, submitted_by: String) -> Self {
        Self {
            id: record.id,
            file_name: record.file_name.clone(),
            product_count: record.product_count,
            submitted_by,
            submitted_at: record.submitted_at,
            status: record.status.to_string(),
            message: record.message.clone(),
        }
    }
}

/// Response for a successful bulk upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadResult {
    pub upload_id: Uuid,
    pub file_name: String,
    /// Number of products in the submitted file
    pub original_count: usize,
    /// Products skipped because their EAN code was already stored
    pub filtered_count: usize,
    /// Products stored by this upload
    pub accepted_count: usize,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
