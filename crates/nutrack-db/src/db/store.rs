//! Store interfaces consumed by the upload pipeline

use std::collections::HashSet;

use async_trait::async_trait;
use nutrack_core::models::{NewUploadRecord, Product, UploadRecord};
use nutrack_core::AppError;
use uuid::Uuid;

/// Display name used when a submitter id cannot be resolved
pub const UNKNOWN_USER: &str = "Unknown user";

/// Product persistence
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Subset of `codes` that is already stored.
    async fn find_existing_codes(&self, codes: &[String]) -> Result<HashSet<String>, AppError>;

    /// Store every product or none of them.
    ///
    /// A uniqueness violation on the EAN code is reported as
    /// [`AppError::PersistenceFailure`] naming the code. On success the returned count
    /// equals `products.len()`.
    async fn insert_products(&self, products: Vec<Product>) -> Result<u64, AppError>;

    /// Delete every product tagged with the upload id; returns the number removed.
    async fn delete_products_by_upload(&self, upload_id: Uuid) -> Result<u64, AppError>;

    async fn list_products_by_upload(&self, upload_id: Uuid) -> Result<Vec<Product>, AppError>;
}

/// Upload record persistence
#[async_trait]
pub trait UploadRecordStore: Send + Sync {
    /// Persist a new PROCESSING record and return it with its assigned id.
    async fn create_upload(&self, new: NewUploadRecord) -> Result<UploadRecord, AppError>;

    /// Persist the status, count and message of a record leaving PROCESSING.
    async fn update_upload(&self, record: &UploadRecord) -> Result<(), AppError>;

    async fn get_upload(&self, id: Uuid) -> Result<Option<UploadRecord>, AppError>;

    /// All records, newest first.
    async fn list_uploads(&self) -> Result<Vec<UploadRecord>, AppError>;

    /// Records of one submitter, newest first.
    async fn list_uploads_by_submitter(
        &self,
        submitted_by: Uuid,
    ) -> Result<Vec<UploadRecord>, AppError>;
}

/// Maps submitter ids to display names
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Never fails for an unknown id; returns [`UNKNOWN_USER`] instead.
    async fn resolve_display_name(&self, user_id: Uuid) -> Result<String, AppError>;
}
