//! Value Objects for the storefront

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier assigned to a product by the relational store.
///
/// Postgres hands out integers; imported catalogs may carry stable string keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Int(i64),
    Key(String),
}

impl ProductId {
    /// Parse a path segment or external key. Integral text becomes `Int`.
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Key(value.to_string()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Key(k) => k.trim().parse().ok(),
        }
    }

    /// The id a synthetic default variant is anchored to. An empty key anchors nothing.
    pub fn as_variant_id(&self) -> Option<VariantId> {
        VariantId::new(self.to_string()).ok()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Key(k) => write!(f, "{}", k),
        }
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self { Self::Int(value) }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self { Self::Key(value.to_string()) }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self { Self::Key(value) }
}

/// Identifier of one purchasable variant combination.
///
/// Only the empty string is refused. Any other supplied text, whitespace or
/// arbitrarily long, is the combination's identity and is kept as given.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariantId(String);

impl VariantId {
    pub fn new(value: impl Into<String>) -> Result<Self, VariantIdError> {
        let value = value.into();
        if value.is_empty() { return Err(VariantIdError::Empty); }
        Ok(Self(value))
    }

    pub fn from_uuid(uuid: Uuid) -> Self { Self(uuid.to_string()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl FromStr for VariantId {
    type Err = VariantIdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::new(s) }
}

impl TryFrom<String> for VariantId {
    type Error = VariantIdError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<VariantId> for String {
    fn from(value: VariantId) -> Self { value.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum VariantIdError { Empty }
impl std::error::Error for VariantIdError {}
impl fmt::Display for VariantIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "variant id empty") }
    }
}

/// URL-safe handle derived from a display name ("Home & Garden" -> "home-garden").
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') { slug.pop(); }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_parse() {
        assert_eq!(ProductId::parse("42"), ProductId::Int(42));
        assert_eq!(ProductId::parse("P100"), ProductId::Key("P100".into()));
        assert_eq!(ProductId::Key("7".into()).as_i64(), Some(7));
    }

    #[test]
    fn test_product_id_json_shapes() {
        let int: ProductId = serde_json::from_str("12").unwrap();
        let key: ProductId = serde_json::from_str("\"P100\"").unwrap();
        assert_eq!(int, ProductId::Int(12));
        assert_eq!(key.to_string(), "P100");
    }

    #[test]
    fn test_empty_product_key_anchors_nothing() {
        assert!(ProductId::Key(String::new()).as_variant_id().is_none());
        assert_eq!(ProductId::Int(5).as_variant_id().unwrap().as_str(), "5");
    }

    #[test]
    fn test_long_product_key_anchors_itself() {
        let key = "P".repeat(200);
        assert_eq!(ProductId::Key(key.clone()).as_variant_id().unwrap().as_str(), key);
    }

    #[test]
    fn test_variant_id_rejects_only_empty() {
        assert_eq!(VariantId::new(""), Err(VariantIdError::Empty));
        assert!(serde_json::from_str::<VariantId>("\"\"").is_err());
        assert_eq!(VariantId::new("V1").unwrap().as_str(), "V1");
        assert_eq!(VariantId::new("   ").unwrap().as_str(), "   ");
        let long = "V".repeat(129);
        assert_eq!(VariantId::new(long.clone()).unwrap().as_str(), long);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Home & Garden"), "home-garden");
        assert_eq!(slugify("  Phones  "), "phones");
        assert_eq!(slugify("West Africa (NG)"), "west-africa-ng");
    }
}
