pub mod catalog;
pub mod database;

pub use catalog::{Catalog, CatalogError};
pub use database::{ProgressEntry, ProgressStore};
