//! Users data source.
//!
//! Drains the paginated user listing, optionally restricted by subject
//! types, then narrows the result through the generic attribute filter on
//! principal name, origin, or origin id.

use async_trait::async_trait;

use super::attribute_values;
use crate::api::models::GraphUser;
use crate::api::{AzdoClient, graph};
use crate::error::ProviderResult;
use crate::filter::{AttributeComparison, filter_by_attributes};
use crate::provider::resource::DataSource;
use crate::provider::resource_data::{AttrMap, AttrValue, ResourceData};
use crate::provider::schema::{AttrKind, AttributeSchema};
use crate::utils::content_hash_id;

/// The `azuredevops_users` data source.
pub struct UsersDataSource {
    schema: Vec<AttributeSchema>,
}

impl UsersDataSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: vec![
                AttributeSchema::optional("principal_name", AttrKind::String)
                    .conflicts_with(&["origin", "origin_id"]),
                AttributeSchema::optional("origin", AttrKind::String)
                    .conflicts_with(&["principal_name"]),
                AttributeSchema::optional("origin_id", AttrKind::String)
                    .conflicts_with(&["principal_name"]),
                AttributeSchema::optional("subject_types", AttrKind::List),
                AttributeSchema::computed("users", AttrKind::List),
            ],
        }
    }
}

impl Default for UsersDataSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the filter comparisons from the configured lookup attributes.
fn comparisons(data: &ResourceData) -> Vec<AttributeComparison> {
    ["principal_name", "origin", "origin_id"]
        .iter()
        .filter_map(|name| {
            data.get_string(name)
                .filter(|value| !value.is_empty())
                .map(|value| AttributeComparison::new(*name, value).ignore_case())
        })
        .collect()
}

/// Flattens users into attribute maps.
fn flatten_users(users: &[GraphUser]) -> Vec<AttrMap> {
    users
        .iter()
        .map(|user| {
            let mut output = AttrMap::new();
            if let Some(descriptor) = &user.descriptor {
                output.insert(
                    "descriptor".to_string(),
                    AttrValue::String(descriptor.clone()),
                );
            }
            if let Some(principal_name) = &user.principal_name {
                output.insert(
                    "principal_name".to_string(),
                    AttrValue::String(principal_name.clone()),
                );
            }
            if let Some(origin) = &user.origin {
                output.insert("origin".to_string(), AttrValue::String(origin.clone()));
            }
            if let Some(origin_id) = &user.origin_id {
                output.insert("origin_id".to_string(), AttrValue::String(origin_id.clone()));
            }
            if let Some(display_name) = &user.display_name {
                output.insert(
                    "display_name".to_string(),
                    AttrValue::String(display_name.clone()),
                );
            }
            if let Some(mail_address) = &user.mail_address {
                output.insert(
                    "mail_address".to_string(),
                    AttrValue::String(mail_address.clone()),
                );
            }
            output
        })
        .collect()
}

#[async_trait]
impl DataSource for UsersDataSource {
    fn type_name(&self) -> &'static str {
        "azuredevops_users"
    }

    fn schema(&self) -> &[AttributeSchema] {
        &self.schema
    }

    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let subject_types = data.get_string_list("subject_types").unwrap_or_default();

        let users = graph::list_users(client, &subject_types).await?;
        let users = filter_by_attributes(users, &comparisons(data))?;
        tracing::trace!(count = users.len(), "read users");

        let results = flatten_users(&users);

        let descriptors = attribute_values(&results, "descriptor")?;
        data.set_id(content_hash_id("users", &descriptors));

        data.set(
            "users",
            AttrValue::List(results.into_iter().map(AttrValue::Map).collect()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Comparison Construction
    ///
    /// Tests which comparisons result from the configured attributes.
    ///
    /// ## Test Scenario
    /// - A bag with only a principal name, then with origin and origin id
    ///
    /// ## Expected Outcome
    /// - One case-insensitive comparison per configured attribute
    #[test]
    fn test_comparisons() {
        let mut data = ResourceData::new();
        data.set("principal_name", "User@Example.com");
        let built = comparisons(&data);
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].name, "principal_name");
        assert!(built[0].ignore_case);
        assert!(!built[0].allow_nil);

        let mut data = ResourceData::new();
        data.set("origin", "aad");
        data.set("origin_id", "abc-123");
        assert_eq!(comparisons(&data).len(), 2);
    }

    /// # Filtering Users by Principal Name
    ///
    /// Tests the end-to-end narrowing of a user list.
    ///
    /// ## Test Scenario
    /// - Two users; filters on a differently-cased principal name
    ///
    /// ## Expected Outcome
    /// - Only the matching user survives the filter
    #[test]
    fn test_filter_users() {
        let users = vec![
            GraphUser {
                descriptor: Some("d-1".to_string()),
                principal_name: Some("alice@example.com".to_string()),
                ..GraphUser::default()
            },
            GraphUser {
                descriptor: Some("d-2".to_string()),
                principal_name: Some("bob@example.com".to_string()),
                ..GraphUser::default()
            },
        ];

        let mut data = ResourceData::new();
        data.set("principal_name", "ALICE@example.com");

        let filtered = filter_by_attributes(users, &comparisons(&data)).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].descriptor.as_deref(), Some("d-1"));
    }

    /// # User Flattening
    ///
    /// Tests the per-user attribute map shape.
    ///
    /// ## Test Scenario
    /// - Flattens a sparsely populated user
    ///
    /// ## Expected Outcome
    /// - Only present fields appear in the map
    #[test]
    fn test_flatten_users() {
        let user = GraphUser {
            descriptor: Some("d-1".to_string()),
            mail_address: Some("alice@example.com".to_string()),
            ..GraphUser::default()
        };

        let results = flatten_users(&[user]);
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].get("descriptor").and_then(AttrValue::as_str),
            Some("d-1")
        );
        assert!(!results[0].contains_key("origin"));
    }
}
