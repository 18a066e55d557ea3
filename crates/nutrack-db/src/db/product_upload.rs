use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nutrack_core::models::{NewUploadRecord, UploadRecord, UploadStatus};
use nutrack_core::AppError;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use super::store::UploadRecordStore;

const UPLOAD_COLUMNS: &str =
    "id, file_name, product_count, submitted_by, submitted_at, status, message";

/// Row shape of `product_uploads`; status is stored as text.
#[derive(Debug, FromRow)]
struct UploadRow {
    id: Uuid,
    file_name: String,
    product_count: i32,
    submitted_by: Uuid,
    submitted_at: DateTime<Utc>,
    status: String,
    message: Option<String>,
}

impl TryFrom<UploadRow> for UploadRecord {
    type Error = AppError;

    fn try_from(row: UploadRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<UploadStatus>().map_err(|e| {
            AppError::Internal(format!("Upload {} has an unreadable status: {}", row.id, e))
        })?;

        Ok(UploadRecord {
            id: row.id,
            file_name: row.file_name,
            product_count: row.product_count,
            submitted_by: row.submitted_by,
            submitted_at: row.submitted_at,
            status,
            message: row.message,
        })
    }
}

fn into_records(rows: Vec<UploadRow>) -> Result<Vec<UploadRecord>, AppError> {
    rows.into_iter().map(UploadRecord::try_from).collect()
}

/// Repository for bulk upload audit records
#[derive(Clone)]
pub struct ProductUploadRepository {
    pool: PgPool,
}

impl ProductUploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadRecordStore for ProductUploadRepository {
    #[tracing::instrument(skip(self, new), fields(db.table = "product_uploads", db.operation = "insert"))]
    async fn create_upload(&self, new: NewUploadRecord) -> Result<UploadRecord, AppError> {
        let record = UploadRecord::processing(Uuid::new_v4(), new);

        sqlx::query(
            r#"
            INSERT INTO product_uploads (
                id, file_name, product_count, submitted_by, submitted_at, status, message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.file_name)
        .bind(record.product_count)
        .bind(record.submitted_by)
        .bind(record.submitted_at)
        .bind(record.status.as_str())
        .bind(&record.message)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "product_uploads", db.operation = "update", db.record_id = %record.id, status = %record.status))]
    async fn update_upload(&self, record: &UploadRecord) -> Result<(), AppError> {
        // Only a PROCESSING row may be finalized
        let result = sqlx::query(
            r#"
            UPDATE product_uploads
            SET status = $2, product_count = $3, message = $4
            WHERE id = $1 AND status = 'PROCESSING'
            "#,
        )
        .bind(record.id)
        .bind(record.status.as_str())
        .bind(record.product_count)
        .bind(&record.message)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::InvalidStateTransition {
                from: "non-PROCESSING or missing record".to_string(),
                to: record.status.to_string(),
            });
        }

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "product_uploads", db.operation = "select", db.record_id = %id))]
    async fn get_upload(&self, id: Uuid) -> Result<Option<UploadRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, UploadRow>(&format!(
            "SELECT {} FROM product_uploads WHERE id = $1",
            UPLOAD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UploadRecord::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "product_uploads", db.operation = "select"))]
    async fn list_uploads(&self) -> Result<Vec<UploadRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, UploadRow>(&format!(
            "SELECT {} FROM product_uploads ORDER BY submitted_at DESC, id",
            UPLOAD_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "product_uploads", db.operation = "select"))]
    async fn list_uploads_by_submitter(
        &self,
        submitted_by: Uuid,
    ) -> Result<Vec<UploadRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, UploadRow>(&format!(
            "SELECT {} FROM product_uploads WHERE submitted_by = $1 ORDER BY submitted_at DESC, id",
            UPLOAD_COLUMNS
        ))
        .bind(submitted_by)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }
}
