//! Database repositories for data access layer
//!
//! The pipeline only talks to the store through the traits in [`store`]; the
//! repositories here are their Postgres implementations.

pub mod product;
pub mod product_upload;
pub mod setup;
pub mod store;
pub mod transaction;
pub mod user;

pub use product::ProductRepository;
pub use product_upload::ProductUploadRepository;
pub use setup::setup_database;
pub use store::{IdentityResolver, ProductStore, UploadRecordStore, UNKNOWN_USER};
pub use user::UserDirectory;
