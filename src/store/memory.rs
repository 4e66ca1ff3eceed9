//! In-memory stores for tests and database-less development runs.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{CatalogStore, Page, ProductFilter, VariantStore};
use crate::domain::aggregates::{Category, Product, ProductDraft, ProductStatus, Region};
use crate::domain::value_objects::ProductId;
use crate::domain::variants::VariantSet;
use crate::Result;

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<i64, Product>,
    categories: BTreeMap<i64, Category>,
    regions: BTreeMap<i64, Region>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Mirrors the Postgres store: integer ids in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Tables>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert_product(&self, draft: &ProductDraft) -> Result<Product> {
        let mut tables = self.inner.write().await;
        let id = tables.next_id();
        let now = Utc::now();
        let product = Product {
            id: ProductId::Int(id),
            name: draft.name.clone(),
            description: draft.description.clone(),
            base_price: draft.base_price,
            stock: draft.stock,
            category_id: draft.category_id,
            region_id: draft.region_id,
            status: ProductStatus::Active,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: &ProductId, draft: &ProductDraft) -> Result<Option<Product>> {
        let Some(key) = id.as_i64() else { return Ok(None) };
        let mut tables = self.inner.write().await;
        Ok(tables.products.get_mut(&key).map(|p| {
            p.name = draft.name.clone();
            p.description = draft.description.clone();
            p.base_price = draft.base_price;
            p.stock = draft.stock;
            p.category_id = draft.category_id;
            p.region_id = draft.region_id;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>> {
        let Some(key) = id.as_i64() else { return Ok(None) };
        Ok(self.inner.read().await.products.get(&key).cloned())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Page<Product>> {
        let tables = self.inner.read().await;
        let mut matching: Vec<&Product> = tables.products.values()
            .filter(|p| !p.is_archived())
            .filter(|p| filter.category_id.map_or(true, |c| p.category_id == Some(c)))
            .filter(|p| filter.region_id.map_or(true, |r| p.region_id == Some(r)))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as i64;
        let data = matching.into_iter()
            .skip(filter.offset() as usize)
            .take(filter.per_page as usize)
            .cloned()
            .collect();
        Ok(Page { data, total, page: filter.page })
    }

    async fn archive_product(&self, id: &ProductId) -> Result<bool> {
        let Some(key) = id.as_i64() else { return Ok(false) };
        let mut tables = self.inner.write().await;
        Ok(match tables.products.get_mut(&key) {
            Some(p) => {
                p.status = ProductStatus::Archived;
                p.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_product(&self, id: &ProductId) -> Result<bool> {
        let Some(key) = id.as_i64() else { return Ok(false) };
        Ok(self.inner.write().await.products.remove(&key).is_some())
    }

    async fn insert_category(&self, name: &str, slug: &str) -> Result<Category> {
        let mut tables = self.inner.write().await;
        let id = tables.next_id();
        let category = Category { id, name: name.to_string(), slug: slug.to_string(), created_at: Utc::now() };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.inner.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut all: Vec<_> = self.inner.read().await.categories.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn insert_region(&self, name: &str, slug: &str, currency: &str) -> Result<Region> {
        let mut tables = self.inner.write().await;
        let id = tables.next_id();
        let region = Region { id, name: name.to_string(), slug: slug.to_string(), currency: currency.to_string(), created_at: Utc::now() };
        tables.regions.insert(id, region.clone());
        Ok(region)
    }

    async fn find_region(&self, id: i64) -> Result<Option<Region>> {
        Ok(self.inner.read().await.regions.get(&id).cloned())
    }

    async fn list_regions(&self) -> Result<Vec<Region>> {
        let mut all: Vec<_> = self.inner.read().await.regions.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryVariantStore {
    inner: RwLock<HashMap<ProductId, VariantSet>>,
}

impl InMemoryVariantStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl VariantStore for InMemoryVariantStore {
    async fn load(&self, product_id: &ProductId) -> Result<Option<VariantSet>> {
        Ok(self.inner.read().await.get(product_id).cloned())
    }

    async fn save(&self, product_id: &ProductId, variants: &VariantSet) -> Result<()> {
        self.inner.write().await.insert(product_id.clone(), variants.clone());
        Ok(())
    }
}
