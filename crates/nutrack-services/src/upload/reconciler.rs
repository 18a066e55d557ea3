use nutrack_core::models::CleanedProductEntry;
use nutrack_core::AppError;
use nutrack_db::ProductStore;

/// A validated batch split against the store
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Entries whose code is not stored yet, in submission order
    pub new: Vec<CleanedProductEntry>,
    /// Entries skipped because their code is already stored, in submission order
    pub existing: Vec<CleanedProductEntry>,
}

impl Reconciliation {
    pub fn existing_codes(&self) -> Vec<&str> {
        self.existing
            .iter()
            .map(|e| e.ean13_code.as_str())
            .collect()
    }
}

/// Partition `entries` into new and already stored products.
///
/// Fails with [`AppError::AllDuplicatesConflict`] when nothing is new.
#[tracing::instrument(skip(store, entries), fields(entry_count = entries.len()))]
pub async fn reconcile(
    store: &dyn ProductStore,
    entries: Vec<CleanedProductEntry>,
) -> Result<Reconciliation, AppError> {
    let codes: Vec<String> = entries.iter().map(|e| e.ean13_code.clone()).collect();
    let stored = store.find_existing_codes(&codes).await?;

    let (existing, new): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|e| stored.contains(&e.ean13_code));

    if new.is_empty() {
        tracing::info!(count = existing.len(), "Every submitted product already exists");
        return Err(AppError::AllDuplicatesConflict {
            codes: existing.into_iter().map(|e| e.ean13_code).collect(),
        });
    }

    tracing::debug!(
        new = new.len(),
        existing = existing.len(),
        "Batch reconciled against store"
    );

    Ok(Reconciliation { new, existing })
}
