//! Upload orchestration and the upload record state machine

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use nutrack_core::models::{NewUploadRecord, Product, UploadRecord, UploadResult, UploadSummary};
use nutrack_core::{AppError, PipelineLimits};
use nutrack_db::{IdentityResolver, ProductStore, UploadRecordStore};
use nutrack_processing::{validate_batch, FileIntake};
use uuid::Uuid;

use super::reconciler::{reconcile, Reconciliation};
use super::writer::write_products;

/// A file as received from the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadFile<'a> {
    pub data: Option<&'a [u8]>,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

impl<'a> UploadFile<'a> {
    pub fn json(data: &'a [u8], filename: &'a str) -> Self {
        Self {
            data: Some(data),
            filename: Some(filename),
            content_type: Some("application/json"),
        }
    }
}

/// Bulk product upload service
pub struct ProductUploadService {
    products: Arc<dyn ProductStore>,
    uploads: Arc<dyn UploadRecordStore>,
    identities: Arc<dyn IdentityResolver>,
    intake: FileIntake,
    limits: PipelineLimits,
}

impl ProductUploadService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        uploads: Arc<dyn UploadRecordStore>,
        identities: Arc<dyn IdentityResolver>,
        limits: PipelineLimits,
    ) -> Self {
        Self {
            products,
            uploads,
            identities,
            intake: FileIntake::new(&limits),
            limits,
        }
    }

    /// Run the whole pipeline for one file.
    ///
    /// Intake, batch validation and reconciliation errors leave no trace in the store.
    /// Once products are about to be written an upload record exists; a write failure
    /// marks it FAILED and the failure is still returned.
    #[tracing::instrument(skip(self, file), fields(submitted_by = %submitted_by, file_name = ?file.filename))]
    pub async fn submit_bulk_upload(
        &self,
        file: UploadFile<'_>,
        submitted_by: Uuid,
    ) -> Result<UploadResult, AppError> {
        let parsed = self
            .intake
            .accept(file.data, file.filename, file.content_type)?;
        let original_count = parsed.entries.len();

        let cleaned = validate_batch(&parsed.entries, &self.limits)?;
        tracing::debug!(entries = cleaned.len(), "Batch validated");

        let reconciliation = reconcile(self.products.as_ref(), cleaned).await?;

        let product_count = i32::try_from(reconciliation.new.len()).map_err(|_| {
            AppError::Internal("Accepted product count does not fit the record".to_string())
        })?;
        let mut record = self
            .uploads
            .create_upload(NewUploadRecord {
                file_name: parsed.file_name,
                product_count,
                submitted_by,
                submitted_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            upload_id = %record.id,
            accepted = reconciliation.new.len(),
            skipped = reconciliation.existing.len(),
            "Upload record created"
        );

        if let Err(err) = write_products(
            self.products.as_ref(),
            &reconciliation.new,
            record.id,
            submitted_by,
        )
        .await
        {
            self.mark_failed(&mut record, &err).await;
            return Err(err);
        }

        record.complete(skipped_message(&reconciliation))?;
        self.uploads.update_upload(&record).await?;

        tracing::info!(
            upload_id = %record.id,
            accepted = reconciliation.new.len(),
            "Upload completed"
        );

        Ok(UploadResult {
            upload_id: record.id,
            file_name: record.file_name,
            original_count,
            filtered_count: reconciliation.existing.len(),
            accepted_count: reconciliation.new.len(),
            status: record.status,
            message: record.message,
        })
    }

    /// Persist FAILED for a record whose products could not be written. A failure to
    /// store the status is logged; the write error is what the caller sees.
    async fn mark_failed(&self, record: &mut UploadRecord, err: &AppError) {
        let message = match err {
            AppError::PersistenceFailure(msg) => msg.clone(),
            other => other.to_string(),
        };

        tracing::warn!(upload_id = %record.id, error = %message, "Upload failed while storing products");

        if let Err(e) = record.fail(message) {
            tracing::error!(upload_id = %record.id, error = %e, "Upload record could not be failed");
            return;
        }

        if let Err(e) = self.uploads.update_upload(record).await {
            tracing::error!(
                upload_id = %record.id,
                error = %e,
                "Failed to persist FAILED status for upload"
            );
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_all_uploads(&self) -> Result<Vec<UploadSummary>, AppError> {
        let records = self.uploads.list_uploads().await?;
        self.summarize(records).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_uploads_by_submitter(
        &self,
        submitted_by: Uuid,
    ) -> Result<Vec<UploadSummary>, AppError> {
        let records = self.uploads.list_uploads_by_submitter(submitted_by).await?;
        self.summarize(records).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_upload_by_id(&self, id: Uuid) -> Result<UploadSummary, AppError> {
        let record = self.require_upload(id).await?;
        let name = self.identities.resolve_display_name(record.submitted_by).await?;
        Ok(UploadSummary::from_record(&record, name))
    }

    /// Delete the products stored by an upload. The upload record itself is kept.
    #[tracing::instrument(skip(self))]
    pub async fn delete_products_by_upload_id(&self, id: Uuid) -> Result<u64, AppError> {
        self.require_upload(id).await?;
        let deleted = self.products.delete_products_by_upload(id).await?;
        tracing::info!(upload_id = %id, deleted, "Deleted products of upload");
        Ok(deleted)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_products_by_upload(&self, id: Uuid) -> Result<Vec<Product>, AppError> {
        self.require_upload(id).await?;
        self.products.list_products_by_upload(id).await
    }

    async fn require_upload(&self, id: Uuid) -> Result<UploadRecord, AppError> {
        self.uploads
            .get_upload(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", id)))
    }

    async fn summarize(&self, records: Vec<UploadRecord>) -> Result<Vec<UploadSummary>, AppError> {
        let mut names: HashMap<Uuid, String> = HashMap::new();
        let mut summaries = Vec::with_capacity(records.len());

        for record in &records {
            let name = match names.get(&record.submitted_by) {
                Some(name) => name.clone(),
                None => {
                    let name = self
                        .identities
                        .resolve_display_name(record.submitted_by)
                        .await?;
                    names.insert(record.submitted_by, name.clone());
                    name
                }
            };
            summaries.push(UploadSummary::from_record(record, name));
        }

        Ok(summaries)
    }
}

/// Informational message for products skipped as already stored.
fn skipped_message(reconciliation: &Reconciliation) -> Option<String> {
    let codes = reconciliation.existing_codes();
    match codes.len() {
        0 => None,
        1 => Some(format!(
            "1 product was skipped because it already exists: {}",
            codes[0]
        )),
        n => Some(format!(
            "{} products were skipped because they already exist: {}",
            n,
            codes.join(", ")
        )),
    }
}
