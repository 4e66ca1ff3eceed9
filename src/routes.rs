//! JSON API for the storefront and admin panel.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::domain::aggregates::{Category, Product, ProductDraft, Region, ResolvedVariant};
use crate::domain::value_objects::ProductId;
use crate::domain::variants::VariantsInput;
use crate::service::{CatalogService, ProductDetail};
use crate::store::{Page, ProductFilter};
use crate::StorefrontError;

type ApiResult<T> = std::result::Result<T, StorefrontError>;

pub fn router(service: CatalogService) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "opensase-storefront"})) }))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/api/v1/products/:id/variants", get(product_variants))
        .route("/api/v1/categories", get(list_categories).post(create_category))
        .route("/api/v1/categories/:id", get(get_category))
        .route("/api/v1/regions", get(list_regions).post(create_region))
        .with_state(service)
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::ProductNotFound | Self::CategoryNotFound | Self::RegionNotFound => (StatusCode::NOT_FOUND, "not_found"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::IdGeneration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "id_generation_error"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            Self::Serialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error"),
            Self::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({"error": code, "message": self.to_string()}))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams { pub page: Option<u32>, pub per_page: Option<u32>, pub category: Option<i64>, pub region: Option<i64> }

#[derive(Debug, Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i32,
    pub category_id: Option<i64>,
    pub region_id: Option<i64>,
    /// Any JSON; omitted or `null` means "not submitted".
    #[serde(default)]
    pub variants: Option<VariantsInput>,
}

impl ProductRequest {
    fn into_parts(self) -> ApiResult<(ProductDraft, Option<VariantsInput>)> {
        self.validate().map_err(|e| StorefrontError::Validation(e.to_string()))?;
        let draft = ProductDraft {
            name: self.name.trim().to_string(),
            description: self.description,
            base_price: self.base_price,
            stock: self.stock,
            category_id: self.category_id,
            region_id: self.region_id,
        };
        Ok((draft, self.variants))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest { #[validate(length(min = 1, max = 120))] pub name: String }

#[derive(Debug, Deserialize, Validate)]
pub struct RegionRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(equal = 3))]
    pub currency: String,
}

async fn list_products(State(s): State<CatalogService>, Query(p): Query<ListParams>) -> ApiResult<Json<Page<Product>>> {
    let mut filter = ProductFilter::new(p.page, p.per_page);
    filter.category_id = p.category;
    filter.region_id = p.region;
    Ok(Json(s.list_products(&filter).await?))
}

async fn get_product(State(s): State<CatalogService>, Path(id): Path<String>) -> ApiResult<Json<ProductDetail>> {
    Ok(Json(s.get_product(&ProductId::parse(&id)).await?))
}

async fn create_product(State(s): State<CatalogService>, Json(r): Json<ProductRequest>) -> ApiResult<(StatusCode, Json<ProductDetail>)> {
    let (draft, variants) = r.into_parts()?;
    let detail = s.create_product(draft, variants.unwrap_or_default()).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn update_product(State(s): State<CatalogService>, Path(id): Path<String>, Json(r): Json<ProductRequest>) -> ApiResult<Json<ProductDetail>> {
    let (draft, variants) = r.into_parts()?;
    Ok(Json(s.update_product(&ProductId::parse(&id), draft, variants).await?))
}

async fn delete_product(State(s): State<CatalogService>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    s.archive_product(&ProductId::parse(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn product_variants(State(s): State<CatalogService>, Path(id): Path<String>) -> ApiResult<Json<Vec<ResolvedVariant>>> {
    Ok(Json(s.storefront_variants(&ProductId::parse(&id)).await?))
}

async fn list_categories(State(s): State<CatalogService>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(s.list_categories().await?))
}

async fn get_category(State(s): State<CatalogService>, Path(id): Path<i64>) -> ApiResult<Json<Category>> {
    Ok(Json(s.get_category(id).await?))
}

async fn create_category(State(s): State<CatalogService>, Json(r): Json<CategoryRequest>) -> ApiResult<(StatusCode, Json<Category>)> {
    r.validate().map_err(|e| StorefrontError::Validation(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(s.create_category(&r.name).await?)))
}

async fn list_regions(State(s): State<CatalogService>) -> ApiResult<Json<Vec<Region>>> {
    Ok(Json(s.list_regions().await?))
}

async fn create_region(State(s): State<CatalogService>, Json(r): Json<RegionRequest>) -> ApiResult<(StatusCode, Json<Region>)> {
    r.validate().map_err(|e| StorefrontError::Validation(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(s.create_region(&r.name, &r.currency).await?)))
}
