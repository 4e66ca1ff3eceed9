//! Boundary decoding of client-supplied variant payloads.
//!
//! Clients post anything under `variants`: nothing, `null`, a bare string, an
//! object missing `variant_combinations`, or combinations with loosely typed
//! fields. None of that is an error. The payload is classified once into
//! [`VariantsInput`] and then normalized into a canonical [`VariantSet`].

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::str::FromStr;

use super::model::{VariantCombination, VariantSet};
use crate::domain::value_objects::VariantId;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum VariantsInput {
    /// Absent or `null`.
    #[default]
    Empty,
    /// Not an object, or `variant_combinations` present but not a sequence.
    Malformed(Value),
    WellFormed(VariantSet),
}

impl VariantsInput {
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Empty,
            Some(Value::Object(fields)) => match fields.get("variant_combinations") {
                None | Some(Value::Null) => Self::WellFormed(VariantSet::new(options_of(&fields), vec![])),
                Some(Value::Array(items)) => {
                    let combinations = items.iter().cloned().map(decode_combination).collect();
                    Self::WellFormed(VariantSet::new(options_of(&fields), combinations))
                }
                Some(_) => Self::Malformed(Value::Object(fields)),
            },
            Some(other) => Self::Malformed(other),
        }
    }

    pub fn is_malformed(&self) -> bool { matches!(self, Self::Malformed(_)) }

    /// Collapse to the canonical shape. Malformed payloads keep only a
    /// well-formed `variant_options` sequence, if they had one.
    pub fn normalize(self) -> VariantSet {
        match self {
            Self::Empty => VariantSet::default(),
            Self::WellFormed(set) => set,
            Self::Malformed(raw) => {
                tracing::debug!(kind = json_kind(&raw), "coercing malformed variants payload to empty set");
                match raw {
                    Value::Object(fields) => VariantSet::new(options_of(&fields), vec![]),
                    _ => VariantSet::default(),
                }
            }
        }
    }
}

impl From<VariantSet> for VariantsInput {
    fn from(set: VariantSet) -> Self { Self::WellFormed(set) }
}

impl<'de> Deserialize<'de> for VariantsInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<Value>::deserialize(deserializer).map(Self::from_value)
    }
}

fn options_of(fields: &Map<String, Value>) -> Vec<Value> {
    match fields.get("variant_options") {
        Some(Value::Array(options)) => options.clone(),
        _ => vec![],
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field-by-field decode; a bad field becomes `None` instead of failing the entry.
fn decode_combination(value: Value) -> VariantCombination {
    let Value::Object(mut fields) = value else {
        return VariantCombination::default();
    };
    VariantCombination {
        variant_id: fields.remove("variant_id").and_then(decode_variant_id),
        name: match fields.remove("name") {
            Some(Value::String(name)) => name,
            _ => String::new(),
        },
        price: fields.remove("price").and_then(decode_decimal),
        original_price: fields.remove("original_price").and_then(decode_decimal),
        stock: fields.remove("stock").and_then(decode_stock),
        sku: match fields.remove("sku") {
            Some(Value::String(sku)) => Some(sku),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        },
        is_default: match fields.remove("is_default") {
            Some(Value::Bool(flag)) => Some(flag),
            _ => None,
        },
        extra: fields,
    }
}

fn decode_variant_id(value: Value) -> Option<VariantId> {
    match value {
        Value::String(s) => VariantId::new(s).ok(),
        Value::Number(n) => VariantId::new(n.to_string()).ok(),
        _ => None,
    }
}

fn decode_decimal(value: Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text).ok().or_else(|| Decimal::from_scientific(&text).ok())
}

fn decode_stock(value: Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
