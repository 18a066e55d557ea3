use std::collections::{HashMap, HashSet};

use nutrack_core::models::{CleanedProductEntry, RawProductEntry};
use nutrack_core::{AppError, PipelineLimits};

use crate::validator::validate_entry;

/// Batch-level rejection reasons
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BatchError {
    #[error("Upload contains no products")]
    Empty,

    #[error("Upload contains {count} products; maximum is {max}")]
    TooLarge { count: usize, max: usize },

    #[error("Product at index {index} is invalid: {}", .errors.join("; "))]
    InvalidEntry { index: usize, errors: Vec<String> },

    #[error("Duplicate EAN codes in upload: {}", .0.join(", "))]
    DuplicateCodes(Vec<String>),
}

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        let message = err.to_string();
        match err {
            BatchError::Empty | BatchError::TooLarge { .. } => AppError::BatchSize(message),
            BatchError::InvalidEntry { index, errors } => {
                AppError::FieldValidation { index, errors }
            }
            BatchError::DuplicateCodes(codes) => AppError::DuplicateInFile { codes },
        }
    }
}

/// Validate a whole submission.
///
/// Entries are validated in order and the first invalid one aborts the batch. Duplicate
/// detection only runs once every entry passed, over the cleaned codes.
pub fn validate_batch(
    entries: &[RawProductEntry],
    limits: &PipelineLimits,
) -> Result<Vec<CleanedProductEntry>, BatchError> {
    if entries.is_empty() {
        return Err(BatchError::Empty);
    }

    if entries.len() > limits.max_products {
        return Err(BatchError::TooLarge {
            count: entries.len(),
            max: limits.max_products,
        });
    }

    let mut cleaned = Vec::with_capacity(entries.len());
    for (index, raw) in entries.iter().enumerate() {
        match validate_entry(raw).into_result() {
            Ok(entry) => cleaned.push(entry),
            Err(errors) => {
                tracing::debug!(
                    index,
                    error_count = errors.len(),
                    "Rejecting batch on invalid entry"
                );
                return Err(BatchError::InvalidEntry { index, errors });
            }
        }
    }

    let duplicates = find_duplicate_codes(&cleaned);
    if !duplicates.is_empty() {
        return Err(BatchError::DuplicateCodes(duplicates));
    }

    Ok(cleaned)
}

/// Codes occurring more than once, each listed once in order of first appearance.
pub fn find_duplicate_codes(entries: &[CleanedProductEntry]) -> Vec<String> {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        *occurrences.entry(entry.ean13_code.as_str()).or_default() += 1;
    }

    let mut reported = HashSet::new();
    entries
        .iter()
        .map(|e| e.ean13_code.as_str())
        .filter(|code| occurrences[code] > 1 && reported.insert(*code))
        .map(str::to_string)
        .collect()
}
