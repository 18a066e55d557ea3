use chrono::{DateTime, Utc};
use nutrack_core::models::{CleanedProductEntry, Product};
use nutrack_core::AppError;
use nutrack_db::ProductStore;
use uuid::Uuid;

/// Build the stored product for one accepted entry.
pub fn to_product(
    entry: &CleanedProductEntry,
    upload_id: Uuid,
    submitted_by: Uuid,
    created_at: DateTime<Utc>,
) -> Product {
    let nutrition = entry.nutrition;
    Product {
        id: Uuid::new_v4(),
        ean13_code: entry.ean13_code.clone(),
        product_name: entry.product_name.clone(),
        amount: entry.amount,
        unit: entry.unit.as_str().to_string(),
        calories: nutrition.calories,
        protein: nutrition.protein,
        carbs: nutrition.carbs,
        fat: nutrition.fat,
        fiber: nutrition.fiber,
        sugar: nutrition.sugar,
        salt: nutrition.salt,
        upload_id,
        created_by: submitted_by,
        created_at,
    }
}

/// Store every accepted entry for one upload, all or nothing.
///
/// Any failure comes back as [`AppError::PersistenceFailure`]. The store checks the
/// stored row count inside its transaction.
#[tracing::instrument(skip(store, entries), fields(upload_id = %upload_id, product_count = entries.len()))]
pub async fn write_products(
    store: &dyn ProductStore,
    entries: &[CleanedProductEntry],
    upload_id: Uuid,
    submitted_by: Uuid,
) -> Result<u64, AppError> {
    let created_at = Utc::now();
    let products: Vec<Product> = entries
        .iter()
        .map(|entry| to_product(entry, upload_id, submitted_by, created_at))
        .collect();

    store
        .insert_products(products)
        .await
        .map_err(|e| match e {
            AppError::PersistenceFailure(_) => e,
            other => AppError::PersistenceFailure(other.to_string()),
        })
}
