//! Data models for the upload pipeline
//!
//! `product` holds the per-entry shapes (raw, cleaned, stored) and `upload` holds the
//! upload record, its status state machine and the summaries handed back to callers.

mod product;
mod upload;

// Re-export all models for convenient imports
pub use product::*;
pub use upload::*;
