//! Attribute schemas and pre-flight validation.
//!
//! Every resource declares the attributes it accepts. Validation runs before
//! any lifecycle operation touches the network: required attributes must be
//! present, values must have the declared type, and mutually exclusive
//! attributes must not both be set.

use uuid::Uuid;

use super::resource_data::{AttrValue, ResourceData};
use crate::error::SchemaError;

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    String,
    Bool,
    Int,
    List,
    Map,
}

impl AttrKind {
    fn matches(self, value: &AttrValue) -> bool {
        matches!(
            (self, value),
            (Self::String, AttrValue::String(_))
                | (Self::Bool, AttrValue::Bool(_))
                | (Self::Int, AttrValue::Int(_))
                | (Self::List, AttrValue::List(_))
                | (Self::Map, AttrValue::Map(_))
        )
    }

    fn describe(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::List => "list",
            Self::Map => "map",
        }
    }
}

/// Declaration of a single resource attribute.
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub kind: AttrKind,
    pub required: bool,
    pub computed: bool,
    pub force_new: bool,
    pub conflicts_with: &'static [&'static str],
}

impl AttributeSchema {
    /// Declares a required input attribute.
    #[must_use]
    pub const fn required(name: &'static str, kind: AttrKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            computed: false,
            force_new: false,
            conflicts_with: &[],
        }
    }

    /// Declares an optional input attribute.
    #[must_use]
    pub const fn optional(name: &'static str, kind: AttrKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            computed: false,
            force_new: false,
            conflicts_with: &[],
        }
    }

    /// Declares an output attribute populated by the provider.
    #[must_use]
    pub const fn computed(name: &'static str, kind: AttrKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            computed: true,
            force_new: false,
            conflicts_with: &[],
        }
    }

    /// Marks changes to this attribute as requiring replacement.
    #[must_use]
    pub const fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Declares attributes that must not be set together with this one.
    #[must_use]
    pub const fn conflicts_with(mut self, names: &'static [&'static str]) -> Self {
        self.conflicts_with = names;
        self
    }
}

/// Validates an attribute bag against a schema.
pub fn validate(schema: &[AttributeSchema], data: &ResourceData) -> Result<(), SchemaError> {
    for (name, value) in data.attrs() {
        let Some(declared) = schema.iter().find(|attr| attr.name == name) else {
            return Err(SchemaError::UnknownAttribute { name: name.clone() });
        };

        if !declared.kind.matches(value) {
            return Err(SchemaError::TypeMismatch {
                name: name.clone(),
                expected: declared.kind.describe(),
            });
        }

        for conflicting in declared.conflicts_with {
            if data.get(conflicting).is_some() {
                return Err(SchemaError::ConflictingAttributes {
                    first: name.clone(),
                    second: (*conflicting).to_string(),
                });
            }
        }
    }

    for declared in schema {
        if declared.required && data.get(declared.name).is_none() {
            return Err(SchemaError::MissingAttribute {
                name: declared.name.to_string(),
            });
        }
    }

    Ok(())
}

/// Parses an attribute value that must be a UUID.
pub fn validate_uuid(name: &str, value: &str) -> Result<Uuid, SchemaError> {
    Uuid::parse_str(value).map_err(|_| SchemaError::InvalidValue {
        name: name.to_string(),
        message: format!("'{value}' is not a valid UUID"),
    })
}
