//! Build API: project resource authorization.

use serde::Deserialize;

use super::client::{API_VERSION, AzdoClient};
use super::models::DefinitionResourceReference;
use crate::error::ApiError;

#[derive(Deserialize)]
struct ResourceRefCollection {
    #[serde(default)]
    value: Vec<DefinitionResourceReference>,
}

/// Authorizes (or deauthorizes) resources for use by pipelines in a project.
pub async fn authorize_project_resources(
    client: &AzdoClient,
    project: &str,
    resources: &[DefinitionResourceReference],
) -> Result<Vec<DefinitionResourceReference>, ApiError> {
    let url = client.org_api_url(
        &[project, "_apis", "build", "authorizedresources"],
        &[("api-version", API_VERSION)],
    )?;

    let collection: ResourceRefCollection = client
        .patch_plain_json(url, resources, "authorize project resources")
        .await?;
    Ok(collection.value)
}

/// Fetches authorized resources of a project, filtered by type and id.
pub async fn get_project_resources(
    client: &AzdoClient,
    project: &str,
    resource_type: Option<&str>,
    resource_id: Option<&str>,
) -> Result<Vec<DefinitionResourceReference>, ApiError> {
    let mut query = vec![("api-version", API_VERSION)];
    if let Some(resource_type) = resource_type {
        query.push(("type", resource_type));
    }
    if let Some(resource_id) = resource_id {
        query.push(("id", resource_id));
    }

    let url = client.org_api_url(&[project, "_apis", "build", "authorizedresources"], &query)?;
    let collection: ResourceRefCollection =
        client.get_json(url, "get project resources").await?;
    Ok(collection.value)
}
