//! Service endpoint resources.
//!
//! Every endpoint type shares the same lifecycle: expand the attribute bag
//! into a [`ServiceEndpoint`], call the endpoint API, flatten the response
//! back. [`EndpointResource`] implements that lifecycle once; each endpoint
//! type plugs in its schema and its authorization expansion through
//! [`EndpointKind`].

mod github;
mod kubernetes;
mod sonarqube;

pub use github::GitHubEndpoint;
pub use kubernetes::KubernetesEndpoint;
pub use sonarqube::SonarqubeEndpoint;

use std::marker::PhantomData;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::api::models::ServiceEndpoint;
use crate::api::{AzdoClient, service_endpoint};
use crate::error::{ApiError, ProviderResult, SchemaError};
use crate::provider::resource::Resource;
use crate::provider::resource_data::{AttrMap, ResourceData};
use crate::provider::schema::{AttrKind, AttributeSchema, validate_uuid};

/// Behavior specific to one endpoint type.
pub trait EndpointKind: Send + Sync + 'static {
    /// Resource type name, e.g. `azuredevops_serviceendpoint_github`.
    const TYPE_NAME: &'static str;

    /// Attributes beyond the shared base schema.
    fn extra_schema() -> Vec<AttributeSchema>;

    /// Fills type, url, authorization, and data of the endpoint.
    fn expand(data: &ResourceData, endpoint: &mut ServiceEndpoint) -> ProviderResult<()>;

    /// Writes type-specific attributes back from the API response.
    fn flatten(data: &mut ResourceData, endpoint: &ServiceEndpoint) -> ProviderResult<()>;
}

/// Generic lifecycle implementation over an [`EndpointKind`].
pub struct EndpointResource<K: EndpointKind> {
    schema: Vec<AttributeSchema>,
    _kind: PhantomData<K>,
}

impl<K: EndpointKind> EndpointResource<K> {
    /// Builds the resource with its composed schema.
    #[must_use]
    pub fn new() -> Self {
        let mut schema = vec![
            AttributeSchema::required("project_id", AttrKind::String).force_new(),
            AttributeSchema::required("service_endpoint_name", AttrKind::String),
            AttributeSchema::optional("description", AttrKind::String),
        ];
        schema.extend(K::extra_schema());
        Self {
            schema,
            _kind: PhantomData,
        }
    }
}

impl<K: EndpointKind> Default for EndpointResource<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Expands the attributes shared by every endpoint type.
///
/// Returns the partially filled endpoint and the owning project id.
pub(crate) fn expand_base(data: &ResourceData) -> ProviderResult<(ServiceEndpoint, String)> {
    let project_id = data.require_string("project_id")?.to_string();

    let mut endpoint = ServiceEndpoint {
        name: Some(data.require_string("service_endpoint_name")?.to_string()),
        description: data.get_string("description").map(str::to_owned),
        owner: Some("library".to_string()),
        ..ServiceEndpoint::default()
    };
    if let Some(id) = data.id() {
        endpoint.id = Some(validate_uuid("id", id)?);
    }

    Ok((endpoint, project_id))
}

/// Flattens the attributes shared by every endpoint type.
pub(crate) fn flatten_base(data: &mut ResourceData, endpoint: &ServiceEndpoint, project_id: &str) {
    if let Some(id) = endpoint.id {
        data.set_id(id.to_string());
    }
    data.set("project_id", project_id);
    if let Some(name) = &endpoint.name {
        data.set("service_endpoint_name", name.as_str());
    }
    if let Some(description) = &endpoint.description {
        data.set("description", description.as_str());
    }
}

/// Content hash remembered for write-only secrets.
///
/// The API never returns secret values, so flattening keeps the configured
/// value and records this hash to make drift in the configuration visible.
pub(crate) fn secret_hash(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// Reads a required string entry out of a nested attribute block.
pub(crate) fn nested_string<'a>(
    block: &'a AttrMap,
    block_name: &str,
    field: &str,
) -> ProviderResult<&'a str> {
    block
        .get(field)
        .and_then(crate::provider::resource_data::AttrValue::as_str)
        .ok_or_else(|| {
            SchemaError::MissingAttribute {
                name: format!("{block_name}.{field}"),
            }
            .into()
        })
}

#[async_trait]
impl<K: EndpointKind> Resource for EndpointResource<K> {
    fn type_name(&self) -> &'static str {
        K::TYPE_NAME
    }

    fn schema(&self) -> &[AttributeSchema] {
        &self.schema
    }

    async fn create(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let (mut endpoint, project_id) = expand_base(data)?;
        K::expand(data, &mut endpoint)?;

        let created = service_endpoint::create_endpoint(client, &project_id, &endpoint).await?;
        if created.id.is_none() {
            return Err(ApiError::UnexpectedResponse {
                message: "created service endpoint has no id".to_string(),
            }
            .into());
        }

        flatten_base(data, &created, &project_id);
        K::flatten(data, &created)
    }

    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let project_id = data.require_string("project_id")?.to_string();
        let endpoint_id = data.id().ok_or_else(|| SchemaError::MissingAttribute {
            name: "id".to_string(),
        })?;
        let endpoint_id = validate_uuid("id", endpoint_id)?;

        let endpoint = service_endpoint::get_endpoint(client, &project_id, endpoint_id).await?;
        flatten_base(data, &endpoint, &project_id);
        K::flatten(data, &endpoint)
    }

    async fn update(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let (mut endpoint, project_id) = expand_base(data)?;
        K::expand(data, &mut endpoint)?;

        let endpoint_id = endpoint.id.ok_or_else(|| SchemaError::MissingAttribute {
            name: "id".to_string(),
        })?;

        let updated =
            service_endpoint::update_endpoint(client, &project_id, endpoint_id, &endpoint).await?;
        flatten_base(data, &updated, &project_id);
        K::flatten(data, &updated)
    }

    async fn delete(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let project_id = data.require_string("project_id")?.to_string();
        let endpoint_id = data.id().ok_or_else(|| SchemaError::MissingAttribute {
            name: "id".to_string(),
        })?;
        let endpoint_id = validate_uuid("id", endpoint_id)?;

        service_endpoint::delete_endpoint(client, &project_id, endpoint_id).await?;
        data.clear_id();
        Ok(())
    }

    async fn import(
        &self,
        client: &AzdoClient,
        id: &str,
        data: &mut ResourceData,
    ) -> ProviderResult<()> {
        // Imported ids look like {project_id}/{service_endpoint_id}.
        let (project_id, endpoint_id) =
            id.split_once('/')
                .ok_or_else(|| SchemaError::InvalidValue {
                    name: "id".to_string(),
                    message: format!(
                        "expected {{project_id}}/{{service_endpoint_id}}, got '{id}'"
                    ),
                })?;
        validate_uuid("project_id", project_id)?;
        validate_uuid("service_endpoint_id", endpoint_id)?;

        data.set("project_id", project_id);
        data.set_id(endpoint_id);
        self.read(client, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Base Expansion and Flattening
    ///
    /// Tests the attribute mapping shared by all endpoint types.
    ///
    /// ## Test Scenario
    /// - Expands a bag with the shared attributes, then flattens a response
    ///
    /// ## Expected Outcome
    /// - Name and description map both ways; the id round-trips
    #[test]
    fn test_base_expand_flatten() {
        let mut data = ResourceData::new();
        data.set("project_id", "proj-id");
        data.set("service_endpoint_name", "my-endpoint");
        data.set("description", "managed");

        let (endpoint, project_id) = expand_base(&data).unwrap();
        assert_eq!(project_id, "proj-id");
        assert_eq!(endpoint.name.as_deref(), Some("my-endpoint"));
        assert_eq!(endpoint.description.as_deref(), Some("managed"));
        assert_eq!(endpoint.id, None);

        let response = ServiceEndpoint {
            id: Some(uuid::Uuid::new_v4()),
            name: Some("renamed".to_string()),
            ..ServiceEndpoint::default()
        };
        flatten_base(&mut data, &response, "proj-id");
        assert_eq!(data.get_string("service_endpoint_name"), Some("renamed"));
        assert!(data.id().is_some());
    }

    /// # Missing Required Base Attribute
    ///
    /// Tests that expansion fails fast without the endpoint name.
    ///
    /// ## Test Scenario
    /// - Expands a bag lacking service_endpoint_name
    ///
    /// ## Expected Outcome
    /// - A schema error naming the attribute, before any network call
    #[test]
    fn test_base_expand_missing_name() {
        let mut data = ResourceData::new();
        data.set("project_id", "proj-id");
        assert!(expand_base(&data).is_err());
    }

    /// # Secret Hash Stability
    ///
    /// Tests the drift-detection hash for write-only secrets.
    ///
    /// ## Test Scenario
    /// - Hashes the same and different secrets
    ///
    /// ## Expected Outcome
    /// - Equal input gives equal hash, different input differs
    #[test]
    fn test_secret_hash() {
        assert_eq!(secret_hash("pat-1"), secret_hash("pat-1"));
        assert_ne!(secret_hash("pat-1"), secret_hash("pat-2"));
    }
}
