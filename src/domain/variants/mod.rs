//! Product variants: document model, input boundary, id generation, reconciliation
pub mod id_gen;
pub mod input;
pub mod model;
pub mod reconcile;

pub use id_gen::{IdGenerationError, IdGenerator, SequentialGenerator, UuidGenerator};
pub use input::VariantsInput;
pub use model::{VariantCombination, VariantSet};
pub use reconcile::{reconcile, reconcile_with_label, Reconciler, DEFAULT_VARIANT_LABEL};
