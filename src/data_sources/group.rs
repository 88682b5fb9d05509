//! Group data source.
//!
//! Looks up a project group in three steps: resolve the project's graph
//! descriptor, drain the paginated group listing scoped to it, then select
//! the group whose display name matches case-insensitively.

use async_trait::async_trait;

use crate::api::{AzdoClient, graph};
use crate::error::{ApiError, ProviderResult};
use crate::provider::resource::DataSource;
use crate::provider::resource_data::ResourceData;
use crate::provider::schema::{AttrKind, AttributeSchema, validate_uuid};
use crate::utils::eq_fold;

/// The `azuredevops_group` data source.
pub struct GroupDataSource {
    schema: Vec<AttributeSchema>,
}

impl GroupDataSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: vec![
                AttributeSchema::required("name", AttrKind::String),
                AttributeSchema::required("project_id", AttrKind::String),
                AttributeSchema::computed("descriptor", AttrKind::String),
            ],
        }
    }
}

impl Default for GroupDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for GroupDataSource {
    fn type_name(&self) -> &'static str {
        "azuredevops_group"
    }

    fn schema(&self) -> &[AttributeSchema] {
        &self.schema
    }

    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let group_name = data.require_string("name")?.to_string();
        let project_id = data.require_string("project_id")?;
        let project_uuid = validate_uuid("project_id", project_id)?;

        let project_descriptor = graph::get_descriptor(client, project_uuid).await?;
        let groups = graph::list_groups(client, Some(&project_descriptor)).await?;

        let target = groups.into_iter().find(|group| {
            group
                .display_name
                .as_deref()
                .is_some_and(|candidate| eq_fold(candidate, &group_name))
        });

        let Some(target) = target else {
            return Err(ApiError::NotFound {
                resource: format!("group {group_name} in project {project_id}"),
            }
            .into());
        };
        let descriptor = target
            .descriptor
            .ok_or_else(|| ApiError::UnexpectedResponse {
                message: format!("group {group_name} has no descriptor"),
            })?;

        data.set_id(descriptor.as_str());
        data.set("descriptor", descriptor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Required Inputs
    ///
    /// Tests that both identifying attributes are required.
    ///
    /// ## Test Scenario
    /// - Declares the schema and inspects the attribute flags
    ///
    /// ## Expected Outcome
    /// - name and project_id are required; descriptor is computed
    #[test]
    fn test_schema_flags() {
        let source = GroupDataSource::new();
        let schema = source.schema();

        let name = schema.iter().find(|attr| attr.name == "name").unwrap();
        assert!(name.required);

        let descriptor = schema.iter().find(|attr| attr.name == "descriptor").unwrap();
        assert!(descriptor.computed);
        assert!(!descriptor.required);
    }
}
