//! Git repositories data source.
//!
//! Lists repositories of the organization or one project, optionally
//! narrowed to a single repository by case-insensitive name.

use async_trait::async_trait;

use super::attribute_values;
use crate::api::models::GitRepository;
use crate::api::{AzdoClient, git};
use crate::error::ProviderResult;
use crate::provider::resource::DataSource;
use crate::provider::resource_data::{AttrMap, AttrValue, ResourceData};
use crate::provider::schema::{AttrKind, AttributeSchema, validate_uuid};
use crate::utils::{content_hash_id, eq_fold};

/// The `azuredevops_git_repositories` data source.
pub struct GitRepositoriesDataSource {
    schema: Vec<AttributeSchema>,
}

impl GitRepositoriesDataSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: vec![
                AttributeSchema::optional("project_id", AttrKind::String),
                AttributeSchema::optional("name", AttrKind::String),
                AttributeSchema::optional("include_hidden", AttrKind::Bool),
                AttributeSchema::computed("repositories", AttrKind::List),
            ],
        }
    }
}

impl Default for GitRepositoriesDataSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Flattens repositories into attribute maps.
fn flatten_repositories(repositories: &[GitRepository]) -> Vec<AttrMap> {
    repositories
        .iter()
        .map(|repository| {
            let mut output = AttrMap::new();
            if let Some(name) = &repository.name {
                output.insert("name".to_string(), AttrValue::String(name.clone()));
            }
            if let Some(id) = repository.id {
                output.insert("id".to_string(), AttrValue::String(id.to_string()));
            }
            if let Some(url) = &repository.url {
                output.insert("url".to_string(), AttrValue::String(url.clone()));
            }
            if let Some(ssh_url) = &repository.ssh_url {
                output.insert("ssh_url".to_string(), AttrValue::String(ssh_url.clone()));
            }
            if let Some(web_url) = &repository.web_url {
                output.insert("web_url".to_string(), AttrValue::String(web_url.clone()));
            }
            if let Some(remote_url) = &repository.remote_url {
                output.insert(
                    "remote_url".to_string(),
                    AttrValue::String(remote_url.clone()),
                );
            }
            if let Some(project_id) = repository.project.as_ref().and_then(|project| project.id) {
                output.insert(
                    "project_id".to_string(),
                    AttrValue::String(project_id.to_string()),
                );
            }
            if let Some(size) = repository.size {
                output.insert("size".to_string(), AttrValue::Int(size as i64));
            }
            output
        })
        .collect()
}

#[async_trait]
impl DataSource for GitRepositoriesDataSource {
    fn type_name(&self) -> &'static str {
        "azuredevops_git_repositories"
    }

    fn schema(&self) -> &[AttributeSchema] {
        &self.schema
    }

    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let project_id = data.get_string("project_id").map(str::to_owned);
        if let Some(project_id) = project_id.as_deref() {
            validate_uuid("project_id", project_id)?;
        }
        let name = data.get_string("name").unwrap_or_default().to_string();
        let include_hidden = data.get_bool("include_hidden").unwrap_or(false);

        let repositories = if !name.is_empty() && project_id.is_some() {
            let repository =
                git::get_repository(client, project_id.as_deref().unwrap_or_default(), &name)
                    .await?;
            vec![repository]
        } else {
            let mut repositories =
                git::list_repositories(client, project_id.as_deref(), include_hidden).await?;
            if !name.is_empty() {
                repositories.retain(|repository| {
                    repository
                        .name
                        .as_deref()
                        .is_some_and(|candidate| eq_fold(candidate, &name))
                });
            }
            repositories
        };
        tracing::trace!(count = repositories.len(), "read git repositories");

        let results = flatten_repositories(&repositories);

        let mut repository_names = attribute_values(&results, "name")?;
        if repository_names.is_empty() && !name.is_empty() {
            repository_names.push(name);
        }
        data.set_id(content_hash_id("gitRepos", &repository_names));

        data.set(
            "repositories",
            AttrValue::List(results.into_iter().map(AttrValue::Map).collect()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::TeamProjectReference;
    use uuid::Uuid;

    /// # Repository Flattening
    ///
    /// Tests the per-repository attribute map shape.
    ///
    /// ## Test Scenario
    /// - Flattens a repository with nested project and size
    ///
    /// ## Expected Outcome
    /// - project_id comes from the nested project; size is an integer
    #[test]
    fn test_flatten_repositories() {
        let project_id = Uuid::new_v4();
        let repository = GitRepository {
            id: Some(Uuid::new_v4()),
            name: Some("backend".to_string()),
            size: Some(1024),
            project: Some(TeamProjectReference {
                id: Some(project_id),
                ..TeamProjectReference::default()
            }),
            ..GitRepository::default()
        };

        let results = flatten_repositories(&[repository]);
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].get("project_id").and_then(AttrValue::as_str),
            Some(project_id.to_string().as_str())
        );
        assert_eq!(results[0].get("size").and_then(AttrValue::as_i64), Some(1024));
        assert!(!results[0].contains_key("ssh_url"));
    }
}
