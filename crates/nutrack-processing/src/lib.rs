//! Stateless validation stages of the bulk product upload pipeline.
//!
//! - [`intake`]: raw upload constraints and JSON parsing
//! - [`validator`]: per-entry field validation and normalization
//! - [`units`]: unit synonym catalogue
//! - [`batch`]: batch size, first-invalid-entry and duplicate checks
//!
//! Nothing here touches the store; every function is pure and safe to call from any task.

pub mod batch;
pub mod intake;
pub mod units;
pub mod validator;

pub use batch::{validate_batch, BatchError};
pub use intake::{FileIntake, IntakeError, ParsedUpload};
pub use validator::{validate_entry, ValidationOutcome};
