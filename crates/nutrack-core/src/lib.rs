//! Nutrack Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every crate of the bulk product upload pipeline.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{PipelineLimits, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
