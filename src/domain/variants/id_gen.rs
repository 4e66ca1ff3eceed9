//! Variant identifier generation

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use crate::domain::value_objects::VariantId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdGenerationError {
    #[error("Entropy source unavailable: {0}")]
    Entropy(String),

    #[error("No unique variant id after {0} attempts")]
    Exhausted(usize),

    #[error("Generator produced an invalid id")]
    Invalid,
}

/// Source of fresh variant identifiers. Shared across request tasks.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn next_id(&self) -> Result<VariantId, IdGenerationError>;
}

/// Random (v4) UUIDs drawn from the operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> Result<VariantId, IdGenerationError> {
        let mut bytes = [0u8; 16];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| IdGenerationError::Entropy(e.to_string()))?;
        Ok(VariantId::from_uuid(uuid::Builder::from_random_bytes(bytes).into_uuid()))
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... ids.
#[derive(Debug)]
pub struct SequentialGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: AtomicU64::new(1) }
    }
}

impl IdGenerator for SequentialGenerator {
    fn next_id(&self) -> Result<VariantId, IdGenerationError> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        VariantId::new(format!("{}-{}", self.prefix, n)).map_err(|_| IdGenerationError::Invalid)
    }
}
