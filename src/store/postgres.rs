//! Postgres-backed stores.
//!
//! Products, categories and regions are ordinary rows. Variant sets live in
//! `product_variants` as JSONB keyed by the product id's text form, so integer
//! and string product ids share one document table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{instrument, warn};

use super::{CatalogStore, Page, ProductFilter, VariantStore};
use crate::domain::aggregates::{Category, Product, ProductDraft, ProductStatus, Region};
use crate::domain::value_objects::ProductId;
use crate::domain::variants::{VariantSet, VariantsInput};
use crate::{Result, StorefrontError};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    base_price: Decimal,
    stock: i32,
    category_id: Option<i64>,
    region_id: Option<i64>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// An unknown `status` is a decode error, never a silent fallback to `active`.
impl TryFrom<ProductRow> for Product {
    type Error = StorefrontError;

    fn try_from(row: ProductRow) -> Result<Self> {
        let status = row.status.parse::<ProductStatus>().map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Product {
            id: ProductId::Int(row.id),
            name: row.name,
            description: row.description,
            base_price: row.base_price,
            stock: row.stock,
            category_id: row.category_id,
            region_id: row.region_id,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow { id: i64, name: String, slug: String, created_at: DateTime<Utc> }

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self { Category { id: r.id, name: r.name, slug: r.slug, created_at: r.created_at } }
}

#[derive(Debug, sqlx::FromRow)]
struct RegionRow { id: i64, name: String, slug: String, currency: String, created_at: DateTime<Utc> }

impl From<RegionRow> for Region {
    fn from(r: RegionRow) -> Self { Region { id: r.id, name: r.name, slug: r.slug, currency: r.currency, created_at: r.created_at } }
}

const PRODUCT_COLUMNS: &str = "id, name, description, base_price, stock, category_id, region_id, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[instrument(skip(self, draft), err)]
    async fn insert_product(&self, draft: &ProductDraft) -> Result<Product> {
        let sql = format!(
            "INSERT INTO products (name, description, base_price, stock, category_id, region_id, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 'active', NOW(), NOW()) RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&draft.name).bind(&draft.description).bind(draft.base_price).bind(draft.stock)
            .bind(draft.category_id).bind(draft.region_id)
            .fetch_one(&self.pool).await?;
        row.try_into()
    }

    #[instrument(skip(self, draft), fields(product_id = %id), err)]
    async fn update_product(&self, id: &ProductId, draft: &ProductDraft) -> Result<Option<Product>> {
        let Some(key) = id.as_i64() else { return Ok(None) };
        let sql = format!(
            "UPDATE products SET name = $2, description = $3, base_price = $4, stock = $5, category_id = $6, region_id = $7, \
             updated_at = NOW() WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(key).bind(&draft.name).bind(&draft.description).bind(draft.base_price).bind(draft.stock)
            .bind(draft.category_id).bind(draft.region_id)
            .fetch_optional(&self.pool).await?;
        row.map(Product::try_from).transpose()
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>> {
        let Some(key) = id.as_i64() else { return Ok(None) };
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql).bind(key).fetch_optional(&self.pool).await?;
        row.map(Product::try_from).transpose()
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Page<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE status <> 'archived' \
             AND ($1::BIGINT IS NULL OR category_id = $1) AND ($2::BIGINT IS NULL OR region_id = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(filter.category_id).bind(filter.region_id)
            .bind(filter.per_page as i64).bind(filter.offset() as i64)
            .fetch_all(&self.pool).await?;
        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM products WHERE status <> 'archived' \
             AND ($1::BIGINT IS NULL OR category_id = $1) AND ($2::BIGINT IS NULL OR region_id = $2)",
        )
        .bind(filter.category_id).bind(filter.region_id)
        .fetch_one(&self.pool).await?;
        let data = rows.into_iter().map(Product::try_from).collect::<Result<_>>()?;
        Ok(Page { data, total: total.0, page: filter.page })
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn archive_product(&self, id: &ProductId) -> Result<bool> {
        let Some(key) = id.as_i64() else { return Ok(false) };
        let done = sqlx::query("UPDATE products SET status = 'archived', updated_at = NOW() WHERE id = $1")
            .bind(key).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete_product(&self, id: &ProductId) -> Result<bool> {
        let Some(key) = id.as_i64() else { return Ok(false) };
        let done = sqlx::query("DELETE FROM products WHERE id = $1").bind(key).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    async fn insert_category(&self, name: &str, slug: &str) -> Result<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name, slug, created_at) VALUES ($1, $2, NOW()) RETURNING id, name, slug, created_at",
        )
        .bind(name).bind(slug).fetch_one(&self.pool).await?;
        Ok(row.into())
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT id, name, slug, created_at FROM categories WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Into::into))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name, slug, created_at FROM categories ORDER BY name")
            .fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_region(&self, name: &str, slug: &str, currency: &str) -> Result<Region> {
        let row = sqlx::query_as::<_, RegionRow>(
            "INSERT INTO regions (name, slug, currency, created_at) VALUES ($1, $2, $3, NOW()) \
             RETURNING id, name, slug, currency, created_at",
        )
        .bind(name).bind(slug).bind(currency).fetch_one(&self.pool).await?;
        Ok(row.into())
    }

    async fn find_region(&self, id: i64) -> Result<Option<Region>> {
        let row = sqlx::query_as::<_, RegionRow>("SELECT id, name, slug, currency, created_at FROM regions WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Into::into))
    }

    async fn list_regions(&self) -> Result<Vec<Region>> {
        let rows = sqlx::query_as::<_, RegionRow>("SELECT id, name, slug, currency, created_at FROM regions ORDER BY name")
            .fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone)]
pub struct PgVariantStore {
    pool: PgPool,
}

impl PgVariantStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl VariantStore for PgVariantStore {
    async fn load(&self, product_id: &ProductId) -> Result<Option<VariantSet>> {
        let row: Option<(Json<Value>,)> = sqlx::query_as("SELECT variants FROM product_variants WHERE product_id = $1")
            .bind(product_id.to_string())
            .fetch_optional(&self.pool).await?;
        Ok(row.map(|(Json(document),)| decode_document(product_id, document)))
    }

    #[instrument(skip(self, variants), fields(product_id = %product_id, combinations = variants.len()), err)]
    async fn save(&self, product_id: &ProductId, variants: &VariantSet) -> Result<()> {
        sqlx::query(
            "INSERT INTO product_variants (product_id, variants, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (product_id) DO UPDATE SET variants = EXCLUDED.variants, updated_at = NOW()",
        )
        .bind(product_id.to_string())
        .bind(Json(variants))
        .execute(&self.pool).await?;
        Ok(())
    }
}

/// Stored documents are decoded as leniently as request payloads.
fn decode_document(product_id: &ProductId, document: Value) -> VariantSet {
    let input = VariantsInput::from_value(Some(document));
    if input.is_malformed() {
        warn!(product_id = %product_id, "stored variant document is malformed; reading it as empty");
    }
    input.normalize()
}
