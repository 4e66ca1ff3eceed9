//! Storage seams: relational catalog rows and per-product variant documents.
//!
//! Both stores are plain find/insert/update surfaces. Writes are
//! last-writer-wins; nothing here coordinates concurrent edits of one product.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::aggregates::{Category, Product, ProductDraft, Region};
use crate::domain::value_objects::ProductId;
use crate::domain::variants::VariantSet;
use crate::Result;

pub use memory::{InMemoryCatalogStore, InMemoryVariantStore};
pub use postgres::{PgCatalogStore, PgVariantStore};

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub page: u32,
    pub per_page: u32,
    pub category_id: Option<i64>,
    pub region_id: Option<i64>,
}

impl ProductFilter {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self { page: page.unwrap_or(1).max(1), per_page: per_page.unwrap_or(20).clamp(1, 100), ..Self::default() }
    }

    pub fn offset(&self) -> u32 { (self.page.max(1) - 1).saturating_mul(self.per_page) }
}

#[derive(Debug, Serialize)]
pub struct Page<T> { pub data: Vec<T>, pub total: i64, pub page: u32 }

/// Relational store: products, categories, regions.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_product(&self, draft: &ProductDraft) -> Result<Product>;
    async fn update_product(&self, id: &ProductId, draft: &ProductDraft) -> Result<Option<Product>>;
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>>;
    /// Archived products are excluded.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Page<Product>>;
    /// Returns false when no such product exists.
    async fn archive_product(&self, id: &ProductId) -> Result<bool>;
    /// Hard delete. Only used to undo an insert whose variant write failed.
    async fn delete_product(&self, id: &ProductId) -> Result<bool>;

    async fn insert_category(&self, name: &str, slug: &str) -> Result<Category>;
    async fn find_category(&self, id: i64) -> Result<Option<Category>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn insert_region(&self, name: &str, slug: &str, currency: &str) -> Result<Region>;
    async fn find_region(&self, id: i64) -> Result<Option<Region>>;
    async fn list_regions(&self) -> Result<Vec<Region>>;
}

/// Document store: one variant set per product, keyed by the relational id.
#[async_trait]
pub trait VariantStore: Send + Sync {
    async fn load(&self, product_id: &ProductId) -> Result<Option<VariantSet>>;
    async fn save(&self, product_id: &ProductId, variants: &VariantSet) -> Result<()>;
}
