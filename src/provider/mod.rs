//! Provider surface: the attribute bag, schemas, lifecycle traits, and the
//! registry binding resource type names to their definitions.

pub mod resource;
pub mod resource_data;
pub mod schema;

pub use resource::{DataSource, Resource};
pub use resource_data::{AttrMap, AttrValue, ResourceData};
pub use schema::{AttrKind, AttributeSchema};

use std::collections::BTreeMap;

use secrecy::SecretString;

use crate::api::AzdoClient;
use crate::config::ProviderConfig;
use crate::data_sources::{
    GitRepositoriesDataSource, GroupDataSource, ProjectsDataSource, UsersDataSource,
};
use crate::error::{ProviderError, ProviderResult};
use crate::resources::{
    EndpointResource, GitHubEndpoint, GitPermissions, GroupMembershipResource, GroupResource,
    KubernetesEndpoint, PermissionResource, ProjectFeaturesResource,
    ResourceAuthorizationResource, ServiceEndpointPermissions, SonarqubeEndpoint,
};

/// The top-level provider: a client plus the registry of definitions.
///
/// Both registries are built eagerly at construction; there is no lazy
/// first-call initialization anywhere in the lookup path.
pub struct Provider {
    client: AzdoClient,
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Box<dyn DataSource>>,
}

impl Provider {
    /// Creates a provider from resolved configuration.
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let (org_service_url, personal_access_token) = config.resolved()?;
        let client = AzdoClient::new(
            &org_service_url,
            SecretString::from(personal_access_token),
        )?;
        Ok(Self::with_client(client))
    }

    /// Creates a provider around an existing client.
    #[must_use]
    pub fn with_client(client: AzdoClient) -> Self {
        let resource_list: Vec<Box<dyn Resource>> = vec![
            Box::new(GroupResource::new()),
            Box::new(GroupMembershipResource::new()),
            Box::new(ProjectFeaturesResource::new()),
            Box::new(ResourceAuthorizationResource::new()),
            Box::new(EndpointResource::<GitHubEndpoint>::new()),
            Box::new(EndpointResource::<KubernetesEndpoint>::new()),
            Box::new(EndpointResource::<SonarqubeEndpoint>::new()),
            Box::new(PermissionResource::<ServiceEndpointPermissions>::new()),
            Box::new(PermissionResource::<GitPermissions>::new()),
        ];
        let data_source_list: Vec<Box<dyn DataSource>> = vec![
            Box::new(ProjectsDataSource::new()),
            Box::new(GitRepositoriesDataSource::new()),
            Box::new(GroupDataSource::new()),
            Box::new(UsersDataSource::new()),
        ];

        let mut resources = BTreeMap::new();
        for resource in resource_list {
            resources.insert(resource.type_name(), resource);
        }
        let mut data_sources = BTreeMap::new();
        for data_source in data_source_list {
            data_sources.insert(data_source.type_name(), data_source);
        }

        Self {
            client,
            resources,
            data_sources,
        }
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &AzdoClient {
        &self.client
    }

    /// Looks up a resource definition by type name.
    #[must_use]
    pub fn resource(&self, type_name: &str) -> Option<&dyn Resource> {
        self.resources.get(type_name).map(|resource| &**resource)
    }

    /// Looks up a data source definition by type name.
    #[must_use]
    pub fn data_source(&self, type_name: &str) -> Option<&dyn DataSource> {
        self.data_sources.get(type_name).map(|data_source| &**data_source)
    }

    /// Registered resource type names, sorted.
    #[must_use]
    pub fn resource_names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Registered data source type names, sorted.
    #[must_use]
    pub fn data_source_names(&self) -> Vec<&'static str> {
        self.data_sources.keys().copied().collect()
    }

    fn lookup_resource(&self, type_name: &str) -> ProviderResult<&dyn Resource> {
        self.resource(type_name).ok_or_else(|| {
            ProviderError::Unsupported(format!("unknown resource type: {type_name}"))
        })
    }

    /// Validates the bag against the schema, then creates the resource.
    pub async fn create(&self, type_name: &str, data: &mut ResourceData) -> ProviderResult<()> {
        let resource = self.lookup_resource(type_name)?;
        schema::validate(resource.schema(), data)?;
        resource.create(&self.client, data).await
    }

    /// Validates the bag against the schema, then refreshes it.
    pub async fn read(&self, type_name: &str, data: &mut ResourceData) -> ProviderResult<()> {
        let resource = self.lookup_resource(type_name)?;
        schema::validate(resource.schema(), data)?;
        resource.read(&self.client, data).await
    }

    /// Validates the bag against the schema, then applies changes.
    pub async fn update(&self, type_name: &str, data: &mut ResourceData) -> ProviderResult<()> {
        let resource = self.lookup_resource(type_name)?;
        schema::validate(resource.schema(), data)?;
        resource.update(&self.client, data).await
    }

    /// Validates the bag against the schema, then deletes the resource.
    pub async fn delete(&self, type_name: &str, data: &mut ResourceData) -> ProviderResult<()> {
        let resource = self.lookup_resource(type_name)?;
        schema::validate(resource.schema(), data)?;
        resource.delete(&self.client, data).await
    }

    /// Seeds the bag from an imported identifier.
    pub async fn import(
        &self,
        type_name: &str,
        id: &str,
        data: &mut ResourceData,
    ) -> ProviderResult<()> {
        let resource = self.lookup_resource(type_name)?;
        resource.import(&self.client, id, data).await
    }

    /// Validates the bag, then reads a data source.
    pub async fn read_data_source(
        &self,
        type_name: &str,
        data: &mut ResourceData,
    ) -> ProviderResult<()> {
        let data_source = self.data_source(type_name).ok_or_else(|| {
            ProviderError::Unsupported(format!("unknown data source type: {type_name}"))
        })?;
        schema::validate(data_source.schema(), data)?;
        data_source.read(&self.client, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> Provider {
        let client = AzdoClient::with_base_urls(
            "org",
            "https://dev.azure.com/org",
            "https://vssps.dev.azure.com/org",
            SecretString::from("pat".to_string()),
        );
        Provider::with_client(client)
    }

    /// # Registry Contents
    ///
    /// Tests that every definition is registered under its type name.
    ///
    /// ## Test Scenario
    /// - Builds a provider and lists both registries
    ///
    /// ## Expected Outcome
    /// - All resource and data source names are present and sorted
    #[test]
    fn test_registry_contents() {
        let provider = test_provider();

        assert_eq!(
            provider.resource_names(),
            vec![
                "azuredevops_git_permissions",
                "azuredevops_group",
                "azuredevops_group_membership",
                "azuredevops_project_features",
                "azuredevops_resource_authorization",
                "azuredevops_serviceendpoint_github",
                "azuredevops_serviceendpoint_kubernetes",
                "azuredevops_serviceendpoint_permissions",
                "azuredevops_serviceendpoint_sonarqube",
            ]
        );
        assert_eq!(
            provider.data_source_names(),
            vec![
                "azuredevops_git_repositories",
                "azuredevops_group",
                "azuredevops_projects",
                "azuredevops_users",
            ]
        );
    }

    /// # Unknown Type Dispatch
    ///
    /// Tests lifecycle dispatch against an unregistered type.
    ///
    /// ## Test Scenario
    /// - Creates a resource with a type name that does not exist
    ///
    /// ## Expected Outcome
    /// - An unsupported-operation error naming the type
    #[tokio::test]
    async fn test_unknown_type() {
        let provider = test_provider();
        let mut data = ResourceData::new();

        let err = provider
            .create("azuredevops_nonexistent", &mut data)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("azuredevops_nonexistent"));
    }

    /// # Pre-Flight Schema Validation
    ///
    /// Tests that dispatch validates before hitting the network.
    ///
    /// ## Test Scenario
    /// - Creates a group membership without its required attributes
    ///
    /// ## Expected Outcome
    /// - A schema error, despite the client pointing nowhere
    #[tokio::test]
    async fn test_validation_before_network() {
        let provider = test_provider();
        let mut data = ResourceData::new();

        let err = provider
            .create("azuredevops_group_membership", &mut data)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Schema(_)));
    }
}
