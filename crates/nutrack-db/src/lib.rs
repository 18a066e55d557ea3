//! Postgres persistence for products, upload records and submitter identities.

pub mod db;

pub use db::*;
