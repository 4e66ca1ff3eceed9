//! Aggregates module
pub mod catalog;
pub mod product;

pub use catalog::{Category, Region};
pub use product::{Product, ProductDraft, ProductError, ProductStatus, ResolvedVariant};
