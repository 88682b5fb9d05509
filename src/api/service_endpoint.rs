//! Service endpoint (service connection) API.

use uuid::Uuid;

use super::client::AzdoClient;
use super::models::ServiceEndpoint;
use crate::error::ApiError;

/// Service endpoint routes are still preview-versioned.
const ENDPOINT_API_VERSION: &str = "7.1-preview.4";

/// Creates a service endpoint in a project.
pub async fn create_endpoint(
    client: &AzdoClient,
    project: &str,
    endpoint: &ServiceEndpoint,
) -> Result<ServiceEndpoint, ApiError> {
    let url = client.org_api_url(
        &[project, "_apis", "serviceendpoint", "endpoints"],
        &[("api-version", ENDPOINT_API_VERSION)],
    )?;
    client
        .post_json(url, endpoint, "create service endpoint")
        .await
}

/// Fetches a service endpoint by id.
pub async fn get_endpoint(
    client: &AzdoClient,
    project: &str,
    endpoint_id: Uuid,
) -> Result<ServiceEndpoint, ApiError> {
    let url = client.org_api_url(
        &[
            project,
            "_apis",
            "serviceendpoint",
            "endpoints",
            &endpoint_id.to_string(),
        ],
        &[("api-version", ENDPOINT_API_VERSION)],
    )?;
    client.get_json(url, "get service endpoint").await
}

/// Replaces a service endpoint.
pub async fn update_endpoint(
    client: &AzdoClient,
    project: &str,
    endpoint_id: Uuid,
    endpoint: &ServiceEndpoint,
) -> Result<ServiceEndpoint, ApiError> {
    let url = client.org_api_url(
        &[
            project,
            "_apis",
            "serviceendpoint",
            "endpoints",
            &endpoint_id.to_string(),
        ],
        &[("api-version", ENDPOINT_API_VERSION)],
    )?;
    client
        .put_json(url, endpoint, "update service endpoint")
        .await
}

/// Deletes a service endpoint.
pub async fn delete_endpoint(
    client: &AzdoClient,
    project: &str,
    endpoint_id: Uuid,
) -> Result<(), ApiError> {
    let url = client.org_api_url(
        &[
            project,
            "_apis",
            "serviceendpoint",
            "endpoints",
            &endpoint_id.to_string(),
        ],
        &[("api-version", ENDPOINT_API_VERSION)],
    )?;
    client.delete(url, "delete service endpoint").await
}
