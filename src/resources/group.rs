//! Group resource.
//!
//! A group is materialized from exactly one creation strategy: linking an
//! external origin id, linking a mail address, or creating a brand new
//! Azure DevOps group from a display name. Only the description is
//! updatable afterwards; everything else forces replacement.

use async_trait::async_trait;

use crate::api::models::{
    GraphGroup, GraphGroupCreationContext, GraphGroupMailAddressCreationContext,
    GraphGroupOriginIdCreationContext, GraphGroupVstsCreationContext,
};
use crate::api::{AzdoClient, graph};
use crate::error::{ApiError, ProviderResult, SchemaError};
use crate::provider::resource::Resource;
use crate::provider::resource_data::ResourceData;
use crate::provider::schema::{AttrKind, AttributeSchema};

/// The `azuredevops_group` resource.
pub struct GroupResource {
    schema: Vec<AttributeSchema>,
}

impl GroupResource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: vec![
                AttributeSchema::optional("scope", AttrKind::String).force_new(),
                AttributeSchema::optional("origin_id", AttrKind::String)
                    .force_new()
                    .conflicts_with(&["mail", "display_name"]),
                AttributeSchema::optional("mail", AttrKind::String)
                    .force_new()
                    .conflicts_with(&["origin_id", "display_name"]),
                AttributeSchema::optional("display_name", AttrKind::String)
                    .force_new()
                    .conflicts_with(&["origin_id", "mail"]),
                AttributeSchema::optional("description", AttrKind::String),
                AttributeSchema::computed("url", AttrKind::String),
                AttributeSchema::computed("origin", AttrKind::String),
                AttributeSchema::computed("subject_kind", AttrKind::String),
                AttributeSchema::computed("domain", AttrKind::String),
                AttributeSchema::computed("principal_name", AttrKind::String),
                AttributeSchema::computed("descriptor", AttrKind::String),
            ],
        }
    }

    /// Picks the creation strategy from the configured attributes.
    fn creation_context(data: &ResourceData) -> ProviderResult<GraphGroupCreationContext> {
        if let Some(origin_id) = data.get_string("origin_id") {
            return Ok(GraphGroupCreationContext::OriginId(
                GraphGroupOriginIdCreationContext {
                    origin_id: origin_id.to_string(),
                },
            ));
        }
        if let Some(mail_address) = data.get_string("mail") {
            return Ok(GraphGroupCreationContext::MailAddress(
                GraphGroupMailAddressCreationContext {
                    mail_address: mail_address.to_string(),
                },
            ));
        }
        if let Some(display_name) = data.get_string("display_name") {
            return Ok(GraphGroupCreationContext::Vsts(
                GraphGroupVstsCreationContext {
                    display_name: display_name.to_string(),
                    description: data.get_string("description").map(str::to_owned),
                },
            ));
        }

        Err(SchemaError::InvalidValue {
            name: "display_name".to_string(),
            message: "unable to determine group creation strategy: set one of origin_id, mail, display_name"
                .to_string(),
        }
        .into())
    }

    /// The descriptor identifying this group, from the id or the attributes.
    fn descriptor(data: &ResourceData) -> ProviderResult<String> {
        data.id()
            .or_else(|| data.get_string("descriptor"))
            .map(str::to_owned)
            .ok_or_else(|| {
                SchemaError::MissingAttribute {
                    name: "descriptor".to_string(),
                }
                .into()
            })
    }
}

impl Default for GroupResource {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the group's attributes into the bag and sets the id.
fn flatten_group(data: &mut ResourceData, group: &GraphGroup) -> ProviderResult<()> {
    let descriptor = group
        .descriptor
        .clone()
        .ok_or_else(|| ApiError::UnexpectedResponse {
            message: "group response has no descriptor".to_string(),
        })?;

    data.set_id(descriptor.as_str());
    data.set("descriptor", descriptor);
    if let Some(display_name) = &group.display_name {
        data.set("display_name", display_name.as_str());
    }
    if let Some(url) = &group.url {
        data.set("url", url.as_str());
    }
    if let Some(origin) = &group.origin {
        data.set("origin", origin.as_str());
    }
    if let Some(origin_id) = &group.origin_id {
        data.set("origin_id", origin_id.as_str());
    }
    if let Some(subject_kind) = &group.subject_kind {
        data.set("subject_kind", subject_kind.as_str());
    }
    if let Some(domain) = &group.domain {
        data.set("domain", domain.as_str());
    }
    if let Some(mail_address) = &group.mail_address {
        data.set("mail", mail_address.as_str());
    }
    if let Some(principal_name) = &group.principal_name {
        data.set("principal_name", principal_name.as_str());
    }
    if let Some(description) = &group.description {
        data.set("description", description.as_str());
    }
    Ok(())
}

#[async_trait]
impl Resource for GroupResource {
    fn type_name(&self) -> &'static str {
        "azuredevops_group"
    }

    fn schema(&self) -> &[AttributeSchema] {
        &self.schema
    }

    async fn create(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let context = Self::creation_context(data)?;
        let scope = data.get_string("scope").map(str::to_owned);

        let group = graph::create_group(client, &context, scope.as_deref()).await?;
        flatten_group(data, &group)
    }

    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let descriptor = Self::descriptor(data)?;
        let group = graph::get_group(client, &descriptor).await?;
        flatten_group(data, &group)
    }

    async fn update(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        // The description is the only updatable attribute.
        let descriptor = Self::descriptor(data)?;
        let description = data.get_string("description").unwrap_or_default().to_string();

        let group = graph::update_group_description(client, &descriptor, &description).await?;
        flatten_group(data, &group)
    }

    async fn delete(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let descriptor = Self::descriptor(data)?;
        graph::delete_group(client, &descriptor).await?;
        data.clear_id();
        Ok(())
    }
}
