//! Nutrack Services Layer
//!
//! Orchestration of the bulk product upload pipeline. The stateless stages live in
//! nutrack-processing and persistence in nutrack-db; this crate wires them to the
//! upload record state machine and exposes the operations used by callers.

pub mod upload;

pub use nutrack_db::{IdentityResolver, ProductStore, UploadRecordStore};
pub use upload::{ProductUploadService, Reconciliation, UploadFile};
