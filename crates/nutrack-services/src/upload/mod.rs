//! Bulk product upload pipeline
//!
//! intake → batch validation → reconciliation → record PROCESSING → write → COMPLETED | FAILED

pub mod reconciler;
pub mod service;
pub mod writer;

pub use reconciler::{reconcile, Reconciliation};
pub use service::{ProductUploadService, UploadFile};
pub use writer::{to_product, write_products};
