//! Domain events
use serde::Serialize;

use crate::domain::value_objects::ProductId;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: ProductId, name: String },
    Updated { product_id: ProductId },
    Archived { product_id: ProductId },
    VariantsReconciled { product_id: ProductId, combinations: usize, generated: usize, synthetic_default: bool },
}

impl ProductEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> String {
        let kind = match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Archived { .. } => "archived",
            Self::VariantsReconciled { .. } => "variants_reconciled",
        };
        format!("storefront.product.{}", kind)
    }

    pub fn product_id(&self) -> &ProductId {
        match self {
            Self::Created { product_id, .. }
            | Self::Updated { product_id }
            | Self::Archived { product_id }
            | Self::VariantsReconciled { product_id, .. } => product_id,
        }
    }
}
