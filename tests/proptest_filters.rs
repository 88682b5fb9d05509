//! Property-based tests using proptest
//!
//! These tests verify the laws of the generic attribute filter against
//! randomized record collections.

use std::collections::BTreeMap;

use azdo_provider::filter::{AttributeComparison, filter_by_attributes};
use azdo_provider::provider::{AttrMap, AttrValue};
use proptest::prelude::*;

/// Generate an arbitrary string-only record
fn arb_record() -> impl Strategy<Value = AttrMap> {
    (
        "[a-z][a-z0-9-]{0,20}",
        prop_oneof!["vsts", "aad", "msa", "ghb"],
        proptest::option::of("[a-z0-9-]{1,16}"),
    )
        .prop_map(|(name, origin, origin_id)| {
            let mut record = BTreeMap::new();
            record.insert("name".to_string(), AttrValue::String(name));
            record.insert("origin".to_string(), AttrValue::String(origin.to_string()));
            if let Some(origin_id) = origin_id {
                record.insert("origin_id".to_string(), AttrValue::String(origin_id));
            }
            record
        })
}

fn arb_records() -> impl Strategy<Value = Vec<AttrMap>> {
    prop::collection::vec(arb_record(), 0..50)
}

proptest! {
    /// Filtering by an empty comparison set is the identity function.
    #[test]
    fn prop_empty_comparisons_are_identity(records in arb_records()) {
        let filtered = filter_by_attributes(records.clone(), &[]).unwrap();
        prop_assert_eq!(filtered, records);
    }

    /// Every record the filter keeps satisfies the comparison, every record
    /// it drops does not, and input order is preserved.
    #[test]
    fn prop_filter_is_a_subsequence(records in arb_records(), needle in "[a-z][a-z0-9-]{0,20}") {
        let comparisons = [AttributeComparison::new("name", needle.clone())];
        let filtered = filter_by_attributes(records.clone(), &comparisons).unwrap();

        // Every kept record matches.
        for record in &filtered {
            prop_assert_eq!(
                record.get("name").and_then(AttrValue::as_str),
                Some(needle.as_str())
            );
        }

        // Kept records appear in the original order.
        let expected: Vec<AttrMap> = records
            .into_iter()
            .filter(|record| {
                record.get("name").and_then(AttrValue::as_str) == Some(needle.as_str())
            })
            .collect();
        prop_assert_eq!(filtered, expected);
    }

    /// Case-insensitive comparison is invariant under case changes of the
    /// comparison value.
    #[test]
    fn prop_ignore_case_is_case_invariant(records in arb_records(), needle in "[a-z][a-z0-9-]{0,20}") {
        let lower = [AttributeComparison::new("name", needle.clone()).ignore_case()];
        let upper = [AttributeComparison::new("name", needle.to_uppercase()).ignore_case()];

        let filtered_lower = filter_by_attributes(records.clone(), &lower).unwrap();
        let filtered_upper = filter_by_attributes(records, &upper).unwrap();
        prop_assert_eq!(filtered_lower, filtered_upper);
    }

    /// With allow_nil set, records lacking the field always survive.
    #[test]
    fn prop_allow_nil_keeps_absent_fields(records in arb_records(), needle in "[a-z0-9-]{1,16}") {
        let comparisons = [AttributeComparison::new("origin_id", needle).allow_nil()];
        let filtered = filter_by_attributes(records.clone(), &comparisons).unwrap();

        let absent_in_input = records
            .iter()
            .filter(|record| !record.contains_key("origin_id"))
            .count();
        let absent_in_output = filtered
            .iter()
            .filter(|record| !record.contains_key("origin_id"))
            .count();
        prop_assert_eq!(absent_in_input, absent_in_output);
    }
}
