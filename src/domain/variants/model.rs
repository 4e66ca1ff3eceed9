//! Variant set document model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::value_objects::VariantId;

/// The purchasable configurations of one product, as stored in the document store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantSet {
    /// Option descriptors (color, storage size, ...). Opaque here.
    #[serde(default)]
    pub variant_options: Vec<Value>,
    #[serde(default)]
    pub variant_combinations: Vec<VariantCombination>,
}

/// One concrete purchasable configuration.
///
/// Null `price`/`stock` defer to the owning product's base values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantCombination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    /// Client fields this service does not interpret (option values, images, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VariantSet {
    pub fn new(variant_options: Vec<Value>, variant_combinations: Vec<VariantCombination>) -> Self {
        Self { variant_options, variant_combinations }
    }

    pub fn len(&self) -> usize { self.variant_combinations.len() }
    pub fn is_empty(&self) -> bool { self.variant_combinations.is_empty() }

    /// A product with no combinations cannot be put in a cart (draft state).
    pub fn is_purchasable(&self) -> bool {
        self.variant_combinations.iter().any(|c| c.variant_id.is_some())
    }

    pub fn find(&self, id: &VariantId) -> Option<&VariantCombination> {
        self.variant_combinations.iter().find(|c| c.variant_id.as_ref() == Some(id))
    }

    /// True when the set holds only the single synthesized default variant.
    pub fn is_synthetic_default(&self) -> bool {
        matches!(self.variant_combinations.as_slice(), [only] if only.is_default == Some(true))
    }

    /// Drop a lone synthetic default so a stored set can be re-anchored to its product.
    pub fn without_synthetic_default(mut self) -> Self {
        if self.is_synthetic_default() {
            self.variant_combinations.clear();
        }
        self
    }

    pub fn variant_ids(&self) -> impl Iterator<Item = &VariantId> {
        self.variant_combinations.iter().filter_map(|c| c.variant_id.as_ref())
    }
}

impl VariantCombination {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_id(mut self, id: VariantId) -> Self {
        self.variant_id = Some(id);
        self
    }

    /// The stand-in combination for a product without real variants.
    pub fn synthetic_default(id: VariantId, label: &str) -> Self {
        Self {
            variant_id: Some(id),
            name: label.to_string(),
            is_default: Some(true),
            ..Self::default()
        }
    }
}
