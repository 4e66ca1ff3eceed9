//! OpenSASE Storefront
//!
//! Self-hosted storefront and admin API for a catalog split across two stores.
//!
//! ## Features
//! - Product, category and region records in a relational store
//! - Per-product variant documents (options + purchasable combinations)
//! - Variant reconciliation: every combination gets a stable, unique id, and a
//!   product without variants gets one synthetic default variant
//! - Storefront price/stock resolution against the product's base values
//! - Product events published to NATS when configured

pub mod config;
pub mod domain;
pub mod routes;
pub mod service;
pub mod store;

pub use config::Config;
pub use domain::aggregates::{Category, Product, ProductDraft, ProductStatus, Region, ResolvedVariant};
pub use domain::value_objects::{ProductId, VariantId};
pub use domain::variants::{
    reconcile, IdGenerationError, IdGenerator, Reconciler, SequentialGenerator, UuidGenerator, VariantCombination,
    VariantSet, VariantsInput,
};
pub use service::{CatalogService, ProductDetail};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Region not found")]
    RegionNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Variant id generation failed: {0}")]
    IdGeneration(#[from] IdGenerationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<domain::aggregates::ProductError> for StorefrontError {
    fn from(e: domain::aggregates::ProductError) -> Self { Self::Validation(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
