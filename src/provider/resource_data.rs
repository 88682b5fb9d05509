//! The host-facing attribute bag.
//!
//! Lifecycle operations receive a [`ResourceData`]: a mutable, string-keyed
//! bag of attribute values plus a stable identifier slot. Operations read
//! their inputs from it and write computed attributes back into it. For
//! updates, the host may record the prior attribute state so resources can
//! diff sets (group membership does).

use std::collections::BTreeMap;

use crate::error::{FilterError, SchemaError};
use crate::filter::FieldAccessible;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    Bool(bool),
    Int(i64),
    List(Vec<AttrValue>),
    Map(AttrMap),
}

/// A string-keyed attribute map, also used for nested blocks and list items.
pub type AttrMap = BTreeMap<String, AttrValue>;

impl AttrValue {
    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a bool.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an int.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested map, if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&AttrMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(value: Vec<AttrValue>) -> Self {
        Self::List(value)
    }
}

impl From<AttrMap> for AttrValue {
    fn from(value: AttrMap) -> Self {
        Self::Map(value)
    }
}

/// Mutable attribute state for one resource instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    attrs: AttrMap,
    prior: Option<AttrMap>,
}

impl ResourceData {
    /// Creates an empty attribute bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an attribute bag from key/value pairs.
    pub fn from_attrs<K, I>(attrs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AttrValue)>,
    {
        Self {
            id: None,
            attrs: attrs
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
            prior: None,
        }
    }

    /// Returns the stable identifier, if set.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Sets the stable identifier.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Clears the identifier, marking the resource as gone.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Returns the raw attribute value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// Returns a string attribute, or `None` when absent or not a string.
    #[must_use]
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(AttrValue::as_str)
    }

    /// Returns a bool attribute, or `None` when absent or not a bool.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.attrs.get(name).and_then(AttrValue::as_bool)
    }

    /// Returns an int attribute, or `None` when absent or not an int.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.attrs.get(name).and_then(AttrValue::as_i64)
    }

    /// Returns a nested map attribute.
    #[must_use]
    pub fn get_map(&self, name: &str) -> Option<&AttrMap> {
        self.attrs.get(name).and_then(AttrValue::as_map)
    }

    /// Returns a list attribute whose items are strings.
    #[must_use]
    pub fn get_string_list(&self, name: &str) -> Option<Vec<String>> {
        let items = self.attrs.get(name).and_then(AttrValue::as_list)?;
        Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect(),
        )
    }

    /// Returns a required string attribute, failing fast when absent.
    pub fn require_string(&self, name: &str) -> Result<&str, SchemaError> {
        match self.attrs.get(name) {
            None => Err(SchemaError::MissingAttribute {
                name: name.to_string(),
            }),
            Some(AttrValue::String(value)) => Ok(value),
            Some(_) => Err(SchemaError::TypeMismatch {
                name: name.to_string(),
                expected: "string",
            }),
        }
    }

    /// Returns a required map attribute, failing fast when absent.
    pub fn require_map(&self, name: &str) -> Result<&AttrMap, SchemaError> {
        match self.attrs.get(name) {
            None => Err(SchemaError::MissingAttribute {
                name: name.to_string(),
            }),
            Some(AttrValue::Map(map)) => Ok(map),
            Some(_) => Err(SchemaError::TypeMismatch {
                name: name.to_string(),
                expected: "map",
            }),
        }
    }

    /// Returns a required bool attribute, failing fast when absent.
    pub fn require_bool(&self, name: &str) -> Result<bool, SchemaError> {
        match self.attrs.get(name) {
            None => Err(SchemaError::MissingAttribute {
                name: name.to_string(),
            }),
            Some(AttrValue::Bool(value)) => Ok(*value),
            Some(_) => Err(SchemaError::TypeMismatch {
                name: name.to_string(),
                expected: "bool",
            }),
        }
    }

    /// Sets an attribute value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Removes an attribute.
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.attrs.remove(name)
    }

    /// Returns the full attribute map.
    #[must_use]
    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// Records the attribute state before a pending update.
    pub fn set_prior(&mut self, prior: AttrMap) {
        self.prior = Some(prior);
    }

    /// Returns the prior value of an attribute, when prior state was recorded.
    #[must_use]
    pub fn prior_value(&self, name: &str) -> Option<&AttrValue> {
        self.prior.as_ref().and_then(|prior| prior.get(name))
    }

    /// Whether an attribute differs from its recorded prior value.
    ///
    /// Without recorded prior state nothing counts as changed.
    #[must_use]
    pub fn has_change(&self, name: &str) -> bool {
        match &self.prior {
            None => false,
            Some(prior) => prior.get(name) != self.attrs.get(name),
        }
    }
}

impl FieldAccessible for AttrMap {
    fn field(&self, name: &str) -> Result<Option<String>, FilterError> {
        match self.get(name) {
            None => Ok(None),
            Some(AttrValue::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(FilterError::NonStringField {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Required Attribute Lookup
    ///
    /// Tests fail-fast behavior of require_string.
    ///
    /// ## Test Scenario
    /// - Looks up a present, an absent, and a mistyped attribute
    ///
    /// ## Expected Outcome
    /// - Present returns the value; absent and mistyped fail with the
    ///   matching schema error before anything else happens
    #[test]
    fn test_require_string() {
        let mut data = ResourceData::new();
        data.set("principal", "descriptor-1");
        data.set("replace", true);

        assert_eq!(data.require_string("principal").unwrap(), "descriptor-1");
        assert_eq!(
            data.require_string("permissions").unwrap_err(),
            SchemaError::MissingAttribute {
                name: "permissions".to_string()
            }
        );
        assert_eq!(
            data.require_string("replace").unwrap_err(),
            SchemaError::TypeMismatch {
                name: "replace".to_string(),
                expected: "string"
            }
        );
    }

    /// # Absent vs Empty String
    ///
    /// Tests that an empty string attribute is present, not absent.
    ///
    /// ## Test Scenario
    /// - Sets an attribute to "" and reads it back
    ///
    /// ## Expected Outcome
    /// - get_string returns Some(""), never folding it into None
    #[test]
    fn test_absent_vs_empty() {
        let mut data = ResourceData::new();
        data.set("description", "");

        assert_eq!(data.get_string("description"), Some(""));
        assert_eq!(data.get_string("missing"), None);
    }

    /// # Change Detection
    ///
    /// Tests has_change against recorded prior state.
    ///
    /// ## Test Scenario
    /// - Records prior state, then mutates one attribute
    ///
    /// ## Expected Outcome
    /// - Only the mutated attribute reports a change
    /// - Without prior state nothing reports a change
    #[test]
    fn test_has_change() {
        let mut data = ResourceData::new();
        data.set("group", "g-1");
        data.set("members", AttrValue::List(vec!["a".into()]));
        assert!(!data.has_change("members"));

        data.set_prior(data.attrs().clone());
        data.set("members", AttrValue::List(vec!["a".into(), "b".into()]));

        assert!(data.has_change("members"));
        assert!(!data.has_change("group"));
    }

    /// # Identifier Lifecycle
    ///
    /// Tests setting and clearing the id slot.
    ///
    /// ## Test Scenario
    /// - Sets then clears the identifier
    ///
    /// ## Expected Outcome
    /// - id reflects each step
    #[test]
    fn test_id_lifecycle() {
        let mut data = ResourceData::new();
        assert_eq!(data.id(), None);

        data.set_id("endpoints/p/e");
        assert_eq!(data.id(), Some("endpoints/p/e"));

        data.clear_id();
        assert_eq!(data.id(), None);
    }
}
