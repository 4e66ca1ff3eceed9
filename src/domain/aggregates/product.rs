//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::value_objects::{ProductId, VariantId};
use crate::domain::variants::VariantCombination;

/// Product row as held by the relational store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub stock: i32,
    pub category_id: Option<i64>,
    pub region_id: Option<i64>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated field set for creating or updating a product.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub stock: i32,
    pub category_id: Option<i64>,
    pub region_id: Option<i64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus { Draft, #[default] Active, Archived }

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Draft => "draft", Self::Active => "active", Self::Archived => "archived" }
    }
}

impl FromStr for ProductStatus {
    type Err = ProductError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(ProductError::UnknownStatus(other.to_string())),
        }
    }
}

/// A combination with its deferred fields filled from the owning product.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedVariant {
    pub variant_id: VariantId,
    pub name: String,
    pub price: Decimal,
    pub original_price: Decimal,
    pub stock: i64,
    pub sku: Option<String>,
    pub is_default: bool,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, base_price: Decimal) -> Self {
        Self { name: name.into(), description: None, base_price, stock: 0, category_id: None, region_id: None }
    }

    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() { return Err(ProductError::MissingName); }
        if self.base_price.is_sign_negative() { return Err(ProductError::NegativePrice); }
        if self.stock < 0 { return Err(ProductError::NegativeStock); }
        Ok(())
    }
}

impl Product {
    pub fn is_archived(&self) -> bool { self.status == ProductStatus::Archived }

    /// The editable fields of this row, for writing it back unchanged.
    pub fn draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            base_price: self.base_price,
            stock: self.stock,
            category_id: self.category_id,
            region_id: self.region_id,
        }
    }

    /// Fill null price/stock from the product's own base values.
    ///
    /// Returns `None` for a combination without an id; reconciled sets never have one.
    pub fn resolve(&self, combination: &VariantCombination) -> Option<ResolvedVariant> {
        let variant_id = combination.variant_id.clone()?;
        let price = combination.price.unwrap_or(self.base_price);
        Some(ResolvedVariant {
            variant_id,
            name: if combination.name.is_empty() { self.name.clone() } else { combination.name.clone() },
            price,
            original_price: combination.original_price.unwrap_or(price),
            stock: combination.stock.unwrap_or(i64::from(self.stock)),
            sku: combination.sku.clone(),
            is_default: combination.is_default == Some(true),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ProductError { MissingName, NegativePrice, NegativeStock, UnknownStatus(String) }
impl std::error::Error for ProductError {}
impl std::fmt::Display for ProductError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "Missing name"),
            Self::NegativePrice => write!(f, "Base price must not be negative"),
            Self::NegativeStock => write!(f, "Stock must not be negative"),
            Self::UnknownStatus(s) => write!(f, "Unknown product status: {}", s),
        }
    }
}
