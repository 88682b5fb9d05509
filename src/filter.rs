//! Generic attribute filtering over heterogeneous record shapes.
//!
//! Data sources narrow API result sets by comparing named fields against
//! user-supplied values. Records come in two shapes: typed API models with
//! optional fields, and generic string-keyed attribute maps. Both expose
//! their fields through the [`FieldAccessible`] trait, so one filter works
//! for all of them without runtime type inspection.
//!
//! The filter is string-only by contract: asking a record for a field that
//! exists but is not a string is a programming error, reported as
//! [`FilterError::NonStringField`].

use crate::error::FilterError;

/// A single equality predicate against one named field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeComparison {
    /// Name of the field to compare.
    pub name: String,
    /// Value the field must equal.
    pub value: String,
    /// Compare case-insensitively when set.
    pub ignore_case: bool,
    /// Treat an absent field as satisfying the predicate when set.
    pub allow_nil: bool,
}

impl AttributeComparison {
    /// Creates a case-sensitive comparison that fails on absent fields.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ignore_case: false,
            allow_nil: false,
        }
    }

    /// Makes the comparison case-insensitive.
    #[must_use]
    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    /// Makes an absent field satisfy the comparison.
    #[must_use]
    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }

    /// Evaluates the predicate against one resolved field value.
    fn matches(&self, field: Option<&str>) -> bool {
        match field {
            None => self.allow_nil,
            Some(actual) => {
                if self.ignore_case {
                    crate::utils::eq_fold(actual, &self.value)
                } else {
                    actual == self.value
                }
            }
        }
    }
}

/// Capability to resolve a named field to an optional string value.
///
/// Implementations return `Ok(None)` for fields that are absent (including
/// optional fields currently unset), and fail with
/// [`FilterError::NonStringField`] when the field exists but is not
/// string-typed.
pub trait FieldAccessible {
    /// Resolves `name` to the field's string value, if present.
    fn field(&self, name: &str) -> Result<Option<String>, FilterError>;
}

/// Selects the records matching every comparison in `comparisons`.
///
/// Order is preserved and an empty comparison set returns the input
/// unchanged. All predicates must hold for a record to be included.
pub fn filter_by_attributes<T: FieldAccessible>(
    records: Vec<T>,
    comparisons: &[AttributeComparison],
) -> Result<Vec<T>, FilterError> {
    if comparisons.is_empty() {
        return Ok(records);
    }

    let mut matched = Vec::with_capacity(records.len());
    for record in records {
        let mut keep = true;
        for comparison in comparisons {
            let value = record.field(&comparison.name)?;
            if !comparison.matches(value.as_deref()) {
                keep = false;
                break;
            }
        }
        if keep {
            matched.push(record);
        }
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct Person {
        name: Option<String>,
        city: Option<String>,
    }

    impl FieldAccessible for Person {
        fn field(&self, name: &str) -> Result<Option<String>, FilterError> {
            match name {
                "name" => Ok(self.name.clone()),
                "city" => Ok(self.city.clone()),
                _ => Ok(None),
            }
        }
    }

    fn people() -> Vec<Person> {
        vec![
            Person {
                name: Some("Alice".to_string()),
                city: Some("Oslo".to_string()),
            },
            Person {
                name: Some("Bob".to_string()),
                city: None,
            },
            Person {
                name: Some("alice".to_string()),
                city: Some("Bergen".to_string()),
            },
        ]
    }

    /// # Filter Identity Law
    ///
    /// Tests that an empty comparison set returns the input unchanged.
    ///
    /// ## Test Scenario
    /// - Filters a record sequence by zero comparisons
    ///
    /// ## Expected Outcome
    /// - Every record survives, in the original order
    #[test]
    fn test_empty_comparisons_return_input_unchanged() {
        let result = filter_by_attributes(people(), &[]).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].name.as_deref(), Some("Alice"));
        assert_eq!(result[2].name.as_deref(), Some("alice"));
    }

    /// # Case-Sensitive and Case-Insensitive Matching
    ///
    /// Tests both comparison modes against the same records.
    ///
    /// ## Test Scenario
    /// - Filters on "Alice" exactly, then with ignore_case
    ///
    /// ## Expected Outcome
    /// - Exact matching selects one record, folded matching selects two
    #[test]
    fn test_case_sensitivity() {
        let exact = filter_by_attributes(people(), &[AttributeComparison::new("name", "Alice")])
            .unwrap();
        assert_eq!(exact.len(), 1);

        let folded = filter_by_attributes(
            people(),
            &[AttributeComparison::new("name", "ALICE").ignore_case()],
        )
        .unwrap();
        assert_eq!(folded.len(), 2);
    }

    /// # Absent Fields and allow_nil
    ///
    /// Tests that a nil field fails a predicate unless allow_nil is set.
    ///
    /// ## Test Scenario
    /// - Filters on the "city" field, which one record lacks
    ///
    /// ## Expected Outcome
    /// - Without allow_nil the record without a city is excluded
    /// - With allow_nil the predicate is skipped for it, regardless of value
    #[test]
    fn test_allow_nil() {
        let strict =
            filter_by_attributes(people(), &[AttributeComparison::new("city", "Oslo")]).unwrap();
        assert_eq!(strict.len(), 1);

        let lenient = filter_by_attributes(
            people(),
            &[AttributeComparison::new("city", "anything").allow_nil()],
        )
        .unwrap();
        // Only Bob has no city; the others have one that doesn't match.
        assert_eq!(lenient.len(), 1);
        assert_eq!(lenient[0].name.as_deref(), Some("Bob"));
    }

    /// # Conjunction Semantics
    ///
    /// Tests that every predicate must hold for a record to be included.
    ///
    /// ## Test Scenario
    /// - Filters on both name (folded) and city
    ///
    /// ## Expected Outcome
    /// - Only the record satisfying both comparisons survives
    #[test]
    fn test_conjunction() {
        let result = filter_by_attributes(
            people(),
            &[
                AttributeComparison::new("name", "alice").ignore_case(),
                AttributeComparison::new("city", "Bergen"),
            ],
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].city.as_deref(), Some("Bergen"));
    }

    /// # Non-String Field Type Error
    ///
    /// Tests that comparing a non-string field is fatal rather than coerced.
    ///
    /// ## Test Scenario
    /// - Filters attribute maps on a field holding a boolean
    ///
    /// ## Expected Outcome
    /// - The filter fails with NonStringField naming the offending field
    #[test]
    fn test_non_string_field_is_a_type_error() {
        use crate::provider::resource_data::AttrValue;

        let mut record = BTreeMap::new();
        record.insert("name".to_string(), AttrValue::String("repo".to_string()));
        record.insert("is_fork".to_string(), AttrValue::Bool(true));

        let err = filter_by_attributes(
            vec![record],
            &[AttributeComparison::new("is_fork", "true")],
        )
        .unwrap_err();

        assert_eq!(
            err,
            FilterError::NonStringField {
                name: "is_fork".to_string()
            }
        );
    }
}
