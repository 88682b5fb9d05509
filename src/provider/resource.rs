//! Lifecycle traits implemented by every resource and data source.

use async_trait::async_trait;

use super::resource_data::ResourceData;
use super::schema::AttributeSchema;
use crate::api::AzdoClient;
use crate::error::{ProviderError, ProviderResult};

/// A managed resource with full lifecycle support.
///
/// Operations receive the attribute bag and run to completion before
/// returning; there is no background work and no state shared across
/// operations.
#[async_trait]
pub trait Resource: Send + Sync {
    /// The resource type name, e.g. `azuredevops_group`.
    fn type_name(&self) -> &'static str;

    /// Declared attributes of this resource.
    fn schema(&self) -> &[AttributeSchema];

    /// Creates the remote object and populates computed attributes.
    async fn create(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()>;

    /// Refreshes the attribute bag from the remote object.
    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()>;

    /// Applies attribute changes to the remote object.
    async fn update(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()>;

    /// Deletes the remote object and clears the identifier.
    async fn delete(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()>;

    /// Seeds the attribute bag from an imported identifier.
    async fn import(
        &self,
        _client: &AzdoClient,
        _id: &str,
        _data: &mut ResourceData,
    ) -> ProviderResult<()> {
        Err(ProviderError::Unsupported(format!(
            "{}: import is not implemented",
            self.type_name()
        )))
    }
}

/// A read-only data source.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// The data source type name, e.g. `azuredevops_projects`.
    fn type_name(&self) -> &'static str;

    /// Declared attributes of this data source.
    fn schema(&self) -> &[AttributeSchema];

    /// Populates computed attributes and sets a stable identifier.
    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()>;
}
