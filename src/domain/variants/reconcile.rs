//! Variant reconciliation
//!
//! Gives every combination of a product a stable, unique `variant_id`:
//!
//! - no combinations and a product id: a single synthetic default anchored to
//!   the product id (`is_default = true`, price/stock deferred to the product)
//! - one or more combinations: supplied ids are kept, missing ones are
//!   generated, and `is_default` is stripped from all of them
//! - no combinations and no product id: left empty (draft product)
//!
//! Pure apart from the injected [`IdGenerator`].

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::id_gen::{IdGenerationError, IdGenerator, UuidGenerator};
use super::input::VariantsInput;
use super::model::{VariantCombination, VariantSet};
use crate::domain::value_objects::{ProductId, VariantId};

pub const DEFAULT_VARIANT_LABEL: &str = "Default";

/// Regeneration attempts when a fresh id collides with one already in the set.
const MAX_ID_ATTEMPTS: usize = 8;

pub fn reconcile(
    variants: VariantSet,
    product_id: Option<&ProductId>,
    ids: &dyn IdGenerator,
) -> Result<VariantSet, IdGenerationError> {
    reconcile_with_label(variants, product_id, ids, DEFAULT_VARIANT_LABEL)
}

pub fn reconcile_with_label(
    mut variants: VariantSet,
    product_id: Option<&ProductId>,
    ids: &dyn IdGenerator,
    default_label: &str,
) -> Result<VariantSet, IdGenerationError> {
    if variants.variant_combinations.is_empty() {
        match product_id.and_then(ProductId::as_variant_id) {
            Some(anchor) => {
                debug!(variant_id = %anchor, "synthesizing default variant");
                variants.variant_combinations = vec![VariantCombination::synthetic_default(anchor, default_label)];
            }
            None => debug!("no combinations and no product id; leaving variants empty"),
        }
        return Ok(variants);
    }

    let supplied: HashSet<VariantId> = variants.variant_ids().cloned().collect();
    let mut seen: HashSet<VariantId> = HashSet::with_capacity(variants.len());
    let mut generated = 0usize;

    for combination in &mut variants.variant_combinations {
        combination.is_default = None;
        let id = match combination.variant_id.take() {
            Some(id) if seen.insert(id.clone()) => id,
            Some(duplicate) => {
                warn!(variant_id = %duplicate, "duplicate variant id in set; assigning a fresh one");
                generated += 1;
                fresh_id(ids, &supplied, &mut seen)?
            }
            None => {
                generated += 1;
                fresh_id(ids, &supplied, &mut seen)?
            }
        };
        combination.variant_id = Some(id);
    }

    debug!(combinations = variants.len(), generated, "reconciled variant combinations");
    Ok(variants)
}

fn fresh_id(
    ids: &dyn IdGenerator,
    supplied: &HashSet<VariantId>,
    seen: &mut HashSet<VariantId>,
) -> Result<VariantId, IdGenerationError> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = ids.next_id()?;
        if !supplied.contains(&id) && seen.insert(id.clone()) {
            return Ok(id);
        }
        warn!(variant_id = %id, "generated variant id collided; retrying");
    }
    Err(IdGenerationError::Exhausted(MAX_ID_ATTEMPTS))
}

/// Reconciler bound to an id source and a default-variant label.
#[derive(Clone, Debug)]
pub struct Reconciler {
    ids: Arc<dyn IdGenerator>,
    default_label: String,
}

impl Reconciler {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids, default_label: DEFAULT_VARIANT_LABEL.to_string() }
    }

    pub fn with_default_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    pub fn default_label(&self) -> &str { &self.default_label }

    pub fn reconcile(&self, variants: VariantSet, product_id: Option<&ProductId>) -> Result<VariantSet, IdGenerationError> {
        reconcile_with_label(variants, product_id, self.ids.as_ref(), &self.default_label)
    }

    pub fn reconcile_input(&self, input: VariantsInput, product_id: Option<&ProductId>) -> Result<VariantSet, IdGenerationError> {
        self.reconcile(input.normalize(), product_id)
    }
}

impl Default for Reconciler {
    fn default() -> Self { Self::new(Arc::new(UuidGenerator)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::variants::id_gen::SequentialGenerator;
    use serde_json::{json, Value};

    fn reconciler() -> Reconciler {
        Reconciler::new(Arc::new(SequentialGenerator::new("gen")))
    }

    fn run(raw: Option<Value>, product_id: Option<ProductId>) -> VariantSet {
        reconciler().reconcile_input(VariantsInput::from_value(raw), product_id.as_ref()).unwrap()
    }

    /// Always hands out the same id.
    #[derive(Debug)]
    struct StuckGenerator(&'static str);
    impl IdGenerator for StuckGenerator {
        fn next_id(&self) -> Result<VariantId, IdGenerationError> { Ok(VariantId::new(self.0).unwrap()) }
    }

    #[derive(Debug)]
    struct BrokenGenerator;
    impl IdGenerator for BrokenGenerator {
        fn next_id(&self) -> Result<VariantId, IdGenerationError> { Err(IdGenerationError::Entropy("no entropy".into())) }
    }

    #[test]
    fn test_null_variants_with_product_id_synthesizes_default() {
        let set = run(None, Some(ProductId::from("P100")));
        assert_eq!(set.variant_combinations.len(), 1);
        let only = &set.variant_combinations[0];
        assert_eq!(only.variant_id.as_ref().unwrap().as_str(), "P100");
        assert_eq!(only.is_default, Some(true));
        assert_eq!(only.name, DEFAULT_VARIANT_LABEL);
        assert_eq!(only.price, None);
        assert_eq!(only.original_price, None);
        assert_eq!(only.stock, None);
        assert_eq!(only.sku, None);

        let out = serde_json::to_value(&set).unwrap();
        assert_eq!(out["variant_combinations"][0]["is_default"], json!(true));
        assert_eq!(out["variant_combinations"][0]["price"], Value::Null);
    }

    #[test]
    fn test_null_variants_without_product_id_stays_empty() {
        let set = run(None, None);
        assert!(set.variant_combinations.is_empty());
        assert!(!set.is_purchasable());
    }

    #[test]
    fn test_integer_product_id_anchors_default() {
        let set = run(Some(json!({"variant_options": []})), Some(ProductId::Int(42)));
        assert_eq!(set.variant_combinations[0].variant_id.as_ref().unwrap().as_str(), "42");
    }

    #[test]
    fn test_empty_product_key_is_treated_as_absent() {
        let set = run(None, Some(ProductId::Key(String::new())));
        assert!(set.variant_combinations.is_empty());
    }

    #[test]
    fn test_long_product_key_anchors_default() {
        let key = "P".repeat(200);
        let set = reconcile(VariantSet::default(), Some(&ProductId::Key(key.clone())), &UuidGenerator).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.variant_combinations[0].variant_id.as_ref().unwrap().as_str(), key);
    }

    #[test]
    fn test_long_and_whitespace_supplied_ids_are_kept() {
        let long = "V".repeat(200);
        let set = run(
            Some(json!({"variant_combinations": [
                {"name": "A", "variant_id": long},
                {"name": "B", "variant_id": "  "},
                {"name": "C", "variant_id": ""}
            ]})),
            Some(ProductId::Int(1)),
        );
        let ids: Vec<_> = set.variant_ids().map(VariantId::as_str).collect();
        assert_eq!(ids, vec![long.as_str(), "  ", "gen-1"]);
    }

    #[test]
    fn test_custom_default_label() {
        let set = reconciler()
            .with_default_label("Standard")
            .reconcile(VariantSet::default(), Some(&ProductId::Int(1)))
            .unwrap();
        assert_eq!(set.variant_combinations[0].name, "Standard");
    }

    #[test]
    fn test_backfills_missing_ids_and_keeps_existing() {
        let set = run(
            Some(json!({"variant_combinations": [
                {"name": "Red/64GB"},
                {"name": "Blue/128GB", "variant_id": "V1"}
            ]})),
            Some(ProductId::from("P100")),
        );
        assert_eq!(set.variant_combinations.len(), 2);
        let first = set.variant_combinations[0].variant_id.as_ref().unwrap();
        assert_ne!(first.as_str(), "V1");
        assert_eq!(first.as_str(), "gen-1");
        assert_eq!(set.variant_combinations[1].variant_id.as_ref().unwrap().as_str(), "V1");
        let out = serde_json::to_value(&set).unwrap();
        for combo in out["variant_combinations"].as_array().unwrap() {
            assert!(combo.get("is_default").is_none());
        }
    }

    #[test]
    fn test_strips_is_default_from_real_variants() {
        let set = run(
            Some(json!({"variant_combinations": [
                {"name": "Only", "variant_id": "V9", "is_default": true}
            ]})),
            Some(ProductId::Int(3)),
        );
        assert_eq!(set.variant_combinations[0].variant_id.as_ref().unwrap().as_str(), "V9");
        assert_eq!(set.variant_combinations[0].is_default, None);
    }

    #[test]
    fn test_options_pass_through() {
        let options = json!([{"name": "Color", "values": ["Red", "Blue"]}]);
        let set = run(
            Some(json!({"variant_options": options.clone(), "variant_combinations": [{"name": "Red"}]})),
            None,
        );
        assert_eq!(Value::Array(set.variant_options), options);
        assert_eq!(set.variant_combinations.len(), 1);
        assert!(set.variant_combinations[0].variant_id.is_some());
    }

    #[test]
    fn test_idempotent_on_real_variants() {
        let r = reconciler();
        let pid = ProductId::Int(8);
        let once = r.reconcile_input(
            VariantsInput::from_value(Some(json!({"variant_combinations": [{"name": "A"}, {"name": "B", "variant_id": "B1"}]}))),
            Some(&pid),
        ).unwrap();
        let twice = r.reconcile(once.clone(), Some(&pid)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_synthetic_id_tracks_product_id() {
        let r = reconciler();
        let first = r.reconcile(VariantSet::default(), Some(&ProductId::Int(1))).unwrap();
        let second = r.reconcile(first.without_synthetic_default(), Some(&ProductId::Int(2))).unwrap();
        assert_eq!(second.variant_combinations[0].variant_id.as_ref().unwrap().as_str(), "2");
    }

    #[test]
    fn test_duplicate_supplied_ids_are_split() {
        let set = run(
            Some(json!({"variant_combinations": [
                {"name": "A", "variant_id": "V1"},
                {"name": "B", "variant_id": "V1"}
            ]})),
            None,
        );
        let ids: Vec<_> = set.variant_ids().map(VariantId::as_str).collect();
        assert_eq!(ids, vec!["V1", "gen-1"]);
    }

    #[test]
    fn test_generated_id_never_reuses_supplied_id() {
        let ids = SequentialGenerator::new("V");
        let input = VariantSet::new(vec![], vec![
            VariantCombination::named("A"),
            VariantCombination::named("B").with_id(VariantId::new("V-1").unwrap()),
        ]);
        let set = reconcile(input, None, &ids).unwrap();
        assert_eq!(set.variant_combinations[0].variant_id.as_ref().unwrap().as_str(), "V-2");
    }

    #[test]
    fn test_stuck_generator_is_exhausted() {
        let input = VariantSet::new(vec![], vec![VariantCombination::named("A"), VariantCombination::named("B")]);
        let err = reconcile(input, None, &StuckGenerator("same")).unwrap_err();
        assert_eq!(err, IdGenerationError::Exhausted(MAX_ID_ATTEMPTS));
    }

    #[test]
    fn test_generator_failure_propagates() {
        let input = VariantSet::new(vec![], vec![VariantCombination::named("A")]);
        assert!(matches!(reconcile(input, None, &BrokenGenerator), Err(IdGenerationError::Entropy(_))));
    }

    #[test]
    fn test_empty_path_never_calls_generator() {
        let set = reconcile(VariantSet::default(), Some(&ProductId::Int(1)), &BrokenGenerator).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_uuid_backed_reconciler() {
        let set = Reconciler::default()
            .reconcile(VariantSet::new(vec![], vec![VariantCombination::named("A")]), None)
            .unwrap();
        let id = set.variant_combinations[0].variant_id.as_ref().unwrap();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_json() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(|n| json!(n)),
                "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
                "[a-zA-Z0-9 ]{120,260}".prop_map(Value::String),
                " {1,3}".prop_map(Value::String),
            ];
            leaf.prop_recursive(3, 24, 6, |inner| prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map(
                    prop_oneof![
                        Just("variant_options".to_string()),
                        Just("variant_combinations".to_string()),
                        Just("variant_id".to_string()),
                        Just("name".to_string()),
                        Just("price".to_string()),
                        Just("is_default".to_string()),
                        "[a-z]{1,6}",
                    ],
                    inner,
                    0..5,
                ).prop_map(|m| Value::Object(m.into_iter().collect())),
            ])
        }

        fn any_product_id() -> impl Strategy<Value = Option<ProductId>> {
            prop_oneof![
                Just(None),
                any::<i64>().prop_map(|n| Some(ProductId::Int(n))),
                "[A-Z][0-9]{1,5}".prop_map(|k| Some(ProductId::Key(k))),
                "[A-Za-z0-9]{129,300}".prop_map(|k| Some(ProductId::Key(k))),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: any payload normalizes and reconciles without fault.
            #[test]
            fn any_payload_reconciles(raw in proptest::option::of(any_json()), pid in any_product_id()) {
                let set = reconciler().reconcile_input(VariantsInput::from_value(raw), pid.as_ref()).unwrap();
                let out = serde_json::to_value(&set).unwrap();
                prop_assert!(out["variant_options"].is_array());
                prop_assert!(out["variant_combinations"].is_array());
                prop_assert!(set.variant_combinations.iter().all(|c| c.variant_id.is_some()));
            }

            /// Property: output ids are pairwise distinct and the default flag only
            /// appears on a lone synthetic variant anchored to the product id.
            #[test]
            fn ids_unique_and_default_only_when_synthetic(raw in proptest::option::of(any_json()), pid in any_product_id()) {
                let had_combinations = !VariantsInput::from_value(raw.clone()).normalize().is_empty();
                let set = reconciler().reconcile_input(VariantsInput::from_value(raw), pid.as_ref()).unwrap();
                let unique: HashSet<_> = set.variant_ids().collect();
                prop_assert_eq!(unique.len(), set.len());
                if had_combinations {
                    prop_assert!(set.variant_combinations.iter().all(|c| c.is_default.is_none()));
                } else if let Some(pid) = &pid {
                    prop_assert_eq!(set.len(), 1);
                    prop_assert_eq!(set.variant_combinations[0].is_default, Some(true));
                    prop_assert_eq!(set.variant_combinations[0].variant_id.as_ref().unwrap().as_str(), pid.to_string());
                } else {
                    prop_assert!(set.is_empty());
                }
            }

            /// Property: N id-less combinations receive N distinct fresh ids.
            #[test]
            fn generated_ids_pairwise_distinct(names in prop::collection::vec("[A-Za-z/0-9]{1,10}", 1..40)) {
                let input = VariantSet::new(vec![], names.iter().map(VariantCombination::named).collect());
                let set = reconcile(input, None, &UuidGenerator).unwrap();
                let unique: HashSet<_> = set.variant_ids().collect();
                prop_assert_eq!(unique.len(), names.len());
            }

            /// Property: re-running on reconciled real variants is a no-op.
            #[test]
            fn idempotent_after_first_pass(combos in prop::collection::vec(any_json(), 1..8), pid in any_product_id()) {
                let r = reconciler();
                let raw = json!({"variant_combinations": combos});
                let once = r.reconcile_input(VariantsInput::from_value(Some(raw)), pid.as_ref()).unwrap();
                let twice = r.reconcile(once.clone(), pid.as_ref()).unwrap();
                prop_assert_eq!(once, twice);
            }
        }
    }
}
