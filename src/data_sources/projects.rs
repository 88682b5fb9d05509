//! Projects data source.
//!
//! Lists projects of the organization filtered by state, or looks a single
//! project up by name. The name lookup early-exits the paginated listing as
//! soon as a page contains a match.

use async_trait::async_trait;

use super::attribute_values;
use crate::api::models::TeamProjectReference;
use crate::api::{AzdoClient, core};
use crate::error::{ProviderResult, SchemaError};
use crate::provider::resource::DataSource;
use crate::provider::resource_data::{AttrMap, AttrValue, ResourceData};
use crate::provider::schema::{AttrKind, AttributeSchema};
use crate::utils::{content_hash_id, eq_fold};

/// Valid project state filters.
const PROJECT_STATES: &[&str] = &[
    "deleting",
    "new",
    "wellFormed",
    "createPending",
    "all",
    "unchanged",
    "deleted",
];

/// The `azuredevops_projects` data source.
pub struct ProjectsDataSource {
    schema: Vec<AttributeSchema>,
}

impl ProjectsDataSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: vec![
                AttributeSchema::optional("project_name", AttrKind::String),
                AttributeSchema::optional("state", AttrKind::String),
                AttributeSchema::computed("projects", AttrKind::List),
            ],
        }
    }
}

impl Default for ProjectsDataSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Flattens project references into attribute maps.
fn flatten_projects(projects: &[TeamProjectReference]) -> Vec<AttrMap> {
    projects
        .iter()
        .map(|project| {
            let mut output = AttrMap::new();
            if let Some(name) = &project.name {
                output.insert("name".to_string(), AttrValue::String(name.clone()));
            }
            if let Some(id) = project.id {
                output.insert("project_id".to_string(), AttrValue::String(id.to_string()));
            }
            if let Some(url) = &project.url {
                output.insert("project_url".to_string(), AttrValue::String(url.clone()));
            }
            if let Some(state) = &project.state {
                output.insert("state".to_string(), AttrValue::String(state.clone()));
            }
            output
        })
        .collect()
}

#[async_trait]
impl DataSource for ProjectsDataSource {
    fn type_name(&self) -> &'static str {
        "azuredevops_projects"
    }

    fn schema(&self) -> &[AttributeSchema] {
        &self.schema
    }

    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let state = data.get_string("state").unwrap_or("all").to_string();
        if !PROJECT_STATES.iter().any(|valid| eq_fold(valid, &state)) {
            return Err(SchemaError::InvalidValue {
                name: "state".to_string(),
                message: format!("'{state}' is not a valid project state"),
            }
            .into());
        }

        let name = data.get_string("project_name").unwrap_or_default().to_string();
        let projects = if name.is_empty() {
            core::list_projects(client, &state).await?
        } else {
            core::find_project_by_name(client, &state, &name)
                .await?
                .map(|project| vec![project])
                .unwrap_or_default()
        };
        tracing::trace!(count = projects.len(), state = %state, "read projects");

        let results = flatten_projects(&projects);

        let mut project_names = attribute_values(&results, "name")?;
        if project_names.is_empty() && !name.is_empty() {
            project_names.push(name);
        }

        let mut hash_parts = vec![state];
        hash_parts.extend(project_names);
        data.set_id(content_hash_id("projects", &hash_parts));

        data.set(
            "projects",
            AttrValue::List(results.into_iter().map(AttrValue::Map).collect()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// # Project Flattening
    ///
    /// Tests the per-project attribute map shape.
    ///
    /// ## Test Scenario
    /// - Flattens one full and one sparse project reference
    ///
    /// ## Expected Outcome
    /// - Present fields map to their attributes; absent ones are omitted
    #[test]
    fn test_flatten_projects() {
        let id = Uuid::new_v4();
        let projects = vec![
            TeamProjectReference {
                id: Some(id),
                name: Some("alpha".to_string()),
                url: Some("https://example/alpha".to_string()),
                state: Some("wellFormed".to_string()),
                ..TeamProjectReference::default()
            },
            TeamProjectReference::default(),
        ];

        let results = flatten_projects(&projects);
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].get("project_id").and_then(AttrValue::as_str),
            Some(id.to_string().as_str())
        );
        assert_eq!(
            results[0].get("state").and_then(AttrValue::as_str),
            Some("wellFormed")
        );
        assert!(results[1].is_empty());
    }

    /// # State Filter Vocabulary
    ///
    /// Tests the accepted project state spellings.
    ///
    /// ## Test Scenario
    /// - Checks a valid state case-insensitively and an invalid one
    ///
    /// ## Expected Outcome
    /// - "WELLFORMED" matches; "closed" does not
    #[test]
    fn test_state_vocabulary() {
        assert!(PROJECT_STATES.iter().any(|valid| eq_fold(valid, "WELLFORMED")));
        assert!(!PROJECT_STATES.iter().any(|valid| eq_fold(valid, "closed")));
    }
}
