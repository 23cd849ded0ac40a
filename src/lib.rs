// Storefront Catalog - Core Library
// Categories, tags and products with their save-time rules, stored in SQLite

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod import;
pub mod logging;
pub mod slug;
pub mod store;
pub mod timestamps;
pub mod validation;

// Re-export commonly used types
pub use config::CatalogConfig;
pub use db::{open_database, open_in_memory, setup_database};
pub use entities::{Category, CategoryRef, Product, Tag};
pub use error::{CatalogError, CatalogResult};
pub use import::{import_csv, import_products, ImportSummary, RejectedRow};
pub use slug::slugify;
pub use timestamps::Timestamps;
pub use validation::{ValidationError, ValidationResult};
