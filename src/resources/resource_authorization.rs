//! Resource authorization resource.
//!
//! Grants or revokes pipeline access to a protected project resource
//! (currently service endpoints). The API has no delete; revocation is an
//! authorize call with `authorized = false`.

use async_trait::async_trait;

use crate::api::models::DefinitionResourceReference;
use crate::api::{AzdoClient, build};
use crate::error::{ApiError, ProviderResult, SchemaError};
use crate::provider::resource::Resource;
use crate::provider::resource_data::ResourceData;
use crate::provider::schema::{AttrKind, AttributeSchema, validate_uuid};

/// The `azuredevops_resource_authorization` resource.
pub struct ResourceAuthorizationResource {
    schema: Vec<AttributeSchema>,
}

impl ResourceAuthorizationResource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: vec![
                AttributeSchema::required("project_id", AttrKind::String).force_new(),
                AttributeSchema::optional("resource_id", AttrKind::String),
                AttributeSchema::optional("type", AttrKind::String),
                AttributeSchema::required("authorized", AttrKind::Bool),
            ],
        }
    }
}

impl Default for ResourceAuthorizationResource {
    fn default() -> Self {
        Self::new()
    }
}

/// Expands the attribute bag into a resource reference and the project id.
fn expand(data: &ResourceData) -> ProviderResult<(DefinitionResourceReference, String)> {
    let project_id = data.require_string("project_id")?.to_string();
    let resource_type = data.get_string("type").unwrap_or("endpoint");
    if resource_type != "endpoint" {
        return Err(SchemaError::InvalidValue {
            name: "type".to_string(),
            message: format!("'{resource_type}' is not supported, expected 'endpoint'"),
        }
        .into());
    }

    let resource_id = data.require_string("resource_id")?;
    validate_uuid("resource_id", resource_id)?;

    let reference = DefinitionResourceReference {
        authorized: Some(data.require_bool("authorized")?),
        id: Some(resource_id.to_string()),
        name: None,
        resource_type: Some(resource_type.to_string()),
    };
    Ok((reference, project_id))
}

/// Writes a resource reference back into the attribute bag.
fn flatten(data: &mut ResourceData, reference: &DefinitionResourceReference, project_id: &str) {
    if let Some(id) = &reference.id {
        data.set_id(id.as_str());
        data.set("resource_id", id.as_str());
    }
    if let Some(resource_type) = &reference.resource_type {
        data.set("type", resource_type.as_str());
    }
    if let Some(authorized) = reference.authorized {
        data.set("authorized", authorized);
    }
    data.set("project_id", project_id);
}

/// Sends the authorization change, failing on an empty response.
async fn send(
    client: &AzdoClient,
    reference: DefinitionResourceReference,
    project_id: &str,
) -> ProviderResult<DefinitionResourceReference> {
    let mut created =
        build::authorize_project_resources(client, project_id, &[reference]).await?;
    if created.is_empty() {
        return Err(ApiError::UnexpectedResponse {
            message: "no project resources have been authorized".to_string(),
        }
        .into());
    }
    Ok(created.remove(0))
}

#[async_trait]
impl Resource for ResourceAuthorizationResource {
    fn type_name(&self) -> &'static str {
        "azuredevops_resource_authorization"
    }

    fn schema(&self) -> &[AttributeSchema] {
        &self.schema
    }

    async fn create(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let (reference, project_id) = expand(data)?;
        send(client, reference, &project_id).await?;
        self.read(client, data).await
    }

    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let (reference, project_id) = expand(data)?;

        if reference.authorized != Some(true) {
            // Nothing to look up remotely for an unauthorized resource.
            flatten(data, &reference, &project_id);
            return Ok(());
        }

        let references = build::get_project_resources(
            client,
            &project_id,
            reference.resource_type.as_deref(),
            reference.id.as_deref(),
        )
        .await?;

        match references.first() {
            // The authorization no longer exists.
            None => data.clear_id(),
            Some(reference) => flatten(data, reference, &project_id),
        }
        Ok(())
    }

    async fn update(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let (reference, project_id) = expand(data)?;
        send(client, reference, &project_id).await?;
        self.read(client, data).await
    }

    async fn delete(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let (mut reference, project_id) = expand(data)?;
        // Deletion works only by revoking the authorization.
        reference.authorized = Some(false);

        send(client, reference, &project_id).await?;
        data.clear_id();
        Ok(())
    }
}
