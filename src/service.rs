//! Catalog service: product create/update across both stores.
//!
//! Write order for a product is relational row first (it assigns the id),
//! then one reconciliation pass over the variants, then the document write
//! keyed by that id. A failed variant step undoes the row write, so a product
//! never exists without its variant document.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::domain::aggregates::{Category, Product, ProductDraft, Region, ResolvedVariant};
use crate::domain::events::ProductEvent;
use crate::domain::value_objects::{slugify, ProductId, VariantId};
use crate::domain::variants::{Reconciler, VariantSet, VariantsInput};
use crate::store::{CatalogStore, Page, ProductFilter, VariantStore};
use crate::{Result, StorefrontError};

/// A product row joined with its variant document.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub variants: VariantSet,
}

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn CatalogStore>,
    variants: Arc<dyn VariantStore>,
    reconciler: Reconciler,
    nats: Option<async_nats::Client>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogStore>, variants: Arc<dyn VariantStore>, reconciler: Reconciler) -> Self {
        Self { catalog, variants, reconciler, nats: None }
    }

    pub fn with_nats(mut self, nats: Option<async_nats::Client>) -> Self {
        self.nats = nats;
        self
    }

    #[instrument(skip(self, draft, variants), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: ProductDraft, variants: VariantsInput) -> Result<ProductDetail> {
        draft.validate()?;
        self.check_references(&draft).await?;

        let product = self.catalog.insert_product(&draft).await?;
        let stored = async {
            let (set, generated) = self.reconcile(&product.id, variants.normalize())?;
            self.variants.save(&product.id, &set).await?;
            Ok::<_, StorefrontError>((set, generated))
        }.await;
        let (variants, generated) = match stored {
            Ok(stored) => stored,
            Err(e) => {
                self.discard_product(&product.id).await;
                return Err(e);
            }
        };
        info!(product_id = %product.id, combinations = variants.len(), generated, "product created");

        self.publish(vec![
            ProductEvent::Created { product_id: product.id.clone(), name: product.name.clone() },
            reconciled_event(&product.id, &variants, generated),
        ]).await;
        Ok(ProductDetail { product, variants })
    }

    /// `variants: None` re-reconciles the stored set, re-anchoring a synthetic default.
    #[instrument(skip(self, draft, variants), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, draft: ProductDraft, variants: Option<VariantsInput>) -> Result<ProductDetail> {
        draft.validate()?;
        self.check_references(&draft).await?;

        let previous = self.catalog.find_product(id).await?.ok_or(StorefrontError::ProductNotFound)?;
        let submitted = match variants {
            Some(input) => input.normalize(),
            None => self.variants.load(&previous.id).await?.unwrap_or_default().without_synthetic_default(),
        };
        let (variants, generated) = self.reconcile(&previous.id, submitted)?;

        let product = self.catalog.update_product(&previous.id, &draft).await?.ok_or(StorefrontError::ProductNotFound)?;
        if let Err(e) = self.variants.save(&product.id, &variants).await {
            if let Err(restore) = self.catalog.update_product(&previous.id, &previous.draft()).await {
                error!(error = %restore, "failed to restore product row after variant write failure");
            }
            return Err(e);
        }
        info!(combinations = variants.len(), generated, "product updated");

        self.publish(vec![
            ProductEvent::Updated { product_id: product.id.clone() },
            reconciled_event(&product.id, &variants, generated),
        ]).await;
        Ok(ProductDetail { product, variants })
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<ProductDetail> {
        let product = self.catalog.find_product(id).await?.ok_or(StorefrontError::ProductNotFound)?;
        let variants = match self.variants.load(&product.id).await? {
            Some(set) => set,
            // Rows written outside this service have no document yet.
            None => self.reconciler.reconcile(VariantSet::default(), Some(&product.id))?,
        };
        Ok(ProductDetail { product, variants })
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Page<Product>> {
        self.catalog.list_products(filter).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn archive_product(&self, id: &ProductId) -> Result<()> {
        if !self.catalog.archive_product(id).await? {
            return Err(StorefrontError::ProductNotFound);
        }
        self.publish(vec![ProductEvent::Archived { product_id: id.clone() }]).await;
        Ok(())
    }

    /// Storefront view: every purchasable combination with prices and stock filled in.
    pub async fn storefront_variants(&self, id: &ProductId) -> Result<Vec<ResolvedVariant>> {
        let detail = self.get_product(id).await?;
        if detail.product.is_archived() {
            return Err(StorefrontError::ProductNotFound);
        }
        Ok(detail.variants.variant_combinations.iter().filter_map(|c| detail.product.resolve(c)).collect())
    }

    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let slug = slug_for(name)?;
        self.catalog.insert_category(name.trim(), &slug).await
    }

    pub async fn get_category(&self, id: i64) -> Result<Category> {
        self.catalog.find_category(id).await?.ok_or(StorefrontError::CategoryNotFound)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.catalog.list_categories().await
    }

    pub async fn create_region(&self, name: &str, currency: &str) -> Result<Region> {
        let slug = slug_for(name)?;
        let currency = currency.trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(StorefrontError::Validation(format!("invalid currency code: {}", currency)));
        }
        self.catalog.insert_region(name.trim(), &slug, &currency).await
    }

    pub async fn list_regions(&self) -> Result<Vec<Region>> {
        self.catalog.list_regions().await
    }

    /// Reconcile once. Returns the set and how many ids were generated.
    fn reconcile(&self, product_id: &ProductId, submitted: VariantSet) -> Result<(VariantSet, usize)> {
        let before: HashSet<VariantId> = submitted.variant_ids().cloned().collect();
        let reconciled = self.reconciler.reconcile(submitted, Some(product_id))?;
        let generated = reconciled.variant_ids().filter(|id| !before.contains(*id)).count();
        Ok((reconciled, generated))
    }

    /// Undo an insert whose variant document could not be written.
    async fn discard_product(&self, id: &ProductId) {
        match self.catalog.delete_product(id).await {
            Ok(_) => warn!(product_id = %id, "discarded product row after variant write failure"),
            Err(e) => error!(product_id = %id, error = %e, "failed to discard product row after variant write failure"),
        }
    }

    async fn check_references(&self, draft: &ProductDraft) -> Result<()> {
        if let Some(id) = draft.category_id {
            if self.catalog.find_category(id).await?.is_none() {
                return Err(StorefrontError::Validation(format!("unknown category {}", id)));
            }
        }
        if let Some(id) = draft.region_id {
            if self.catalog.find_region(id).await?.is_none() {
                return Err(StorefrontError::Validation(format!("unknown region {}", id)));
            }
        }
        Ok(())
    }

    async fn publish(&self, events: Vec<ProductEvent>) {
        let Some(nats) = &self.nats else { return };
        for event in events {
            let payload = match serde_json::to_vec(&event) {
                Ok(p) => p,
                Err(e) => { warn!(error = %e, "failed to encode product event"); continue; }
            };
            if let Err(e) = nats.publish(event.subject(), payload.into()).await {
                warn!(error = %e, subject = %event.subject(), "failed to publish product event");
            }
        }
    }
}

fn reconciled_event(product_id: &ProductId, set: &VariantSet, generated: usize) -> ProductEvent {
    ProductEvent::VariantsReconciled {
        product_id: product_id.clone(),
        combinations: set.len(),
        generated,
        synthetic_default: set.is_synthetic_default(),
    }
}

fn slug_for(name: &str) -> Result<String> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(StorefrontError::Validation("name must contain letters or digits".into()));
    }
    Ok(slug)
}
