use std::collections::HashSet;

use async_trait::async_trait;
use nutrack_core::models::Product;
use nutrack_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::store::ProductStore;
use super::transaction::with_transaction;

const PRODUCT_COLUMNS: &str = "id, ean13_code, product_name, amount, unit, calories, protein, \
     carbs, fat, fiber, sugar, salt, upload_id, created_by, created_at";

/// Products table repository
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate an insert failure for one product. A unique violation means another
/// upload stored the same code after reconciliation ran.
fn map_insert_error(err: sqlx::Error, ean13_code: &str) -> AppError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            tracing::warn!(
                ean13_code = %ean13_code,
                constraint = ?db_err.constraint(),
                "EAN code already stored by a concurrent upload"
            );
            AppError::PersistenceFailure(format!(
                "EAN code {} was stored by a concurrent upload",
                ean13_code
            ))
        }
        other => {
            tracing::error!(error = %other, ean13_code = %ean13_code, "Failed to insert product");
            AppError::PersistenceFailure(other.to_string())
        }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    #[tracing::instrument(skip(self, codes), fields(db.table = "products", db.operation = "select", code_count = codes.len()))]
    async fn find_existing_codes(&self, codes: &[String]) -> Result<HashSet<String>, AppError> {
        if codes.is_empty() {
            return Ok(HashSet::new());
        }

        let existing: Vec<String> = sqlx::query_scalar(
            "SELECT ean13_code FROM products WHERE ean13_code = ANY($1)",
        )
        .bind(codes)
        .fetch_all(&self.pool)
        .await?;

        Ok(existing.into_iter().collect())
    }

    #[tracing::instrument(skip(self, products), fields(db.table = "products", db.operation = "insert", product_count = products.len()))]
    async fn insert_products(&self, products: Vec<Product>) -> Result<u64, AppError> {
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let mut inserted = 0u64;
                for product in &products {
                    let result = sqlx::query(
                        r#"
                        INSERT INTO products (
                            id, ean13_code, product_name, amount, unit,
                            calories, protein, carbs, fat, fiber, sugar, salt,
                            upload_id, created_by, created_at
                        )
                        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                        "#,
                    )
                    .bind(product.id)
                    .bind(&product.ean13_code)
                    .bind(&product.product_name)
                    .bind(product.amount)
                    .bind(&product.unit)
                    .bind(product.calories)
                    .bind(product.protein)
                    .bind(product.carbs)
                    .bind(product.fat)
                    .bind(product.fiber)
                    .bind(product.sugar)
                    .bind(product.salt)
                    .bind(product.upload_id)
                    .bind(product.created_by)
                    .bind(product.created_at)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| map_insert_error(e, &product.ean13_code))?;

                    inserted += result.rows_affected();
                }

                if inserted != products.len() as u64 {
                    return Err(AppError::PersistenceFailure(format!(
                        "Stored {} of {} products",
                        inserted,
                        products.len()
                    )));
                }
                Ok::<_, AppError>(inserted)
            })
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "delete", db.record_id = %upload_id))]
    async fn delete_products_by_upload(&self, upload_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE upload_id = $1")
            .bind(upload_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "products", db.operation = "select", db.record_id = %upload_id))]
    async fn list_products_by_upload(&self, upload_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<Postgres, Product>(&format!(
            "SELECT {} FROM products WHERE upload_id = $1 ORDER BY created_at, ean13_code",
            PRODUCT_COLUMNS
        ))
        .bind(upload_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}
