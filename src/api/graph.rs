//! Graph API: descriptors, groups, users, and memberships.
//!
//! The graph area lives on the vssps endpoint and is still versioned as a
//! preview API. Group and user listings paginate through the continuation
//! token header.

use uuid::Uuid;

use super::client::AzdoClient;
use super::models::{
    GraphDescriptorResult, GraphGroup, GraphGroupCreationContext, GraphMembership, GraphUser,
    JsonPatchOperation,
};
use super::pagination::{self, Page};
use crate::error::ApiError;

/// Graph endpoints are preview-only.
const GRAPH_API_VERSION: &str = "7.1-preview.1";

/// Resolves the graph descriptor for a storage key (e.g. a project id).
pub async fn get_descriptor(client: &AzdoClient, storage_key: Uuid) -> Result<String, ApiError> {
    let url = client.graph_api_url(
        &["_apis", "graph", "descriptors", &storage_key.to_string()],
        &[("api-version", GRAPH_API_VERSION)],
    )?;

    let result: GraphDescriptorResult = client.get_json(url, "get descriptor").await?;
    result.value.ok_or_else(|| ApiError::UnexpectedResponse {
        message: format!("no descriptor returned for storage key {storage_key}"),
    })
}

/// Fetches one page of groups, optionally scoped by a descriptor.
async fn group_page(
    client: AzdoClient,
    scope_descriptor: Option<String>,
    token: String,
) -> Result<Page<GraphGroup>, ApiError> {
    let mut query = vec![("api-version", GRAPH_API_VERSION)];
    if let Some(scope) = scope_descriptor.as_deref() {
        query.push(("scopeDescriptor", scope));
    }
    if !token.is_empty() {
        query.push(("continuationToken", token.as_str()));
    }

    let url = client.graph_api_url(&["_apis", "graph", "groups"], &query)?;
    client.get_paged(url, "list groups").await
}

/// Lists every group visible under `scope_descriptor` (or the organization).
pub async fn list_groups(
    client: &AzdoClient,
    scope_descriptor: Option<&str>,
) -> Result<Vec<GraphGroup>, ApiError> {
    pagination::collect_all(|token| {
        group_page(
            client.clone(),
            scope_descriptor.map(str::to_owned),
            token,
        )
    })
    .await
}

/// Fetches a group by its descriptor.
pub async fn get_group(client: &AzdoClient, descriptor: &str) -> Result<GraphGroup, ApiError> {
    let url = client.graph_api_url(
        &["_apis", "graph", "groups", descriptor],
        &[("api-version", GRAPH_API_VERSION)],
    )?;
    client.get_json(url, "get group").await
}

/// Creates a group from one of the supported creation contexts.
pub async fn create_group(
    client: &AzdoClient,
    context: &GraphGroupCreationContext,
    scope_descriptor: Option<&str>,
) -> Result<GraphGroup, ApiError> {
    let mut query = vec![("api-version", GRAPH_API_VERSION)];
    if let Some(scope) = scope_descriptor {
        query.push(("scopeDescriptor", scope));
    }

    let url = client.graph_api_url(&["_apis", "graph", "groups"], &query)?;
    client.post_json(url, context, "create group").await
}

/// Replaces the description of a group.
///
/// The description is the only updatable group attribute.
pub async fn update_group_description(
    client: &AzdoClient,
    descriptor: &str,
    description: &str,
) -> Result<GraphGroup, ApiError> {
    let url = client.graph_api_url(
        &["_apis", "graph", "groups", descriptor],
        &[("api-version", GRAPH_API_VERSION)],
    )?;

    let patch = vec![JsonPatchOperation {
        op: "replace".to_string(),
        path: "/description".to_string(),
        from: None,
        value: serde_json::json!(description),
    }];

    client.patch_json(url, &patch, "update group").await
}

/// Deletes a group by its descriptor.
pub async fn delete_group(client: &AzdoClient, descriptor: &str) -> Result<(), ApiError> {
    let url = client.graph_api_url(
        &["_apis", "graph", "groups", descriptor],
        &[("api-version", GRAPH_API_VERSION)],
    )?;
    client.delete(url, "delete group").await
}

/// Fetches one page of users, optionally restricted to subject types.
async fn user_page(
    client: AzdoClient,
    subject_types: Vec<String>,
    token: String,
) -> Result<Page<GraphUser>, ApiError> {
    let joined = subject_types.join(",");
    let mut query = vec![("api-version", GRAPH_API_VERSION)];
    if !joined.is_empty() {
        query.push(("subjectTypes", joined.as_str()));
    }
    if !token.is_empty() {
        query.push(("continuationToken", token.as_str()));
    }

    let url = client.graph_api_url(&["_apis", "graph", "users"], &query)?;
    client.get_paged(url, "list users").await
}

/// Lists every user in the organization, optionally restricted by subject type.
pub async fn list_users(
    client: &AzdoClient,
    subject_types: &[String],
) -> Result<Vec<GraphUser>, ApiError> {
    pagination::collect_all(|token| user_page(client.clone(), subject_types.to_vec(), token)).await
}

/// Adds `subject_descriptor` to the container group.
pub async fn add_membership(
    client: &AzdoClient,
    subject_descriptor: &str,
    container_descriptor: &str,
) -> Result<GraphMembership, ApiError> {
    let url = client.graph_api_url(
        &[
            "_apis",
            "graph",
            "memberships",
            subject_descriptor,
            container_descriptor,
        ],
        &[("api-version", GRAPH_API_VERSION)],
    )?;
    client
        .put_json(url, &serde_json::json!({}), "add membership")
        .await
}

/// Removes `subject_descriptor` from the container group.
pub async fn remove_membership(
    client: &AzdoClient,
    subject_descriptor: &str,
    container_descriptor: &str,
) -> Result<(), ApiError> {
    let url = client.graph_api_url(
        &[
            "_apis",
            "graph",
            "memberships",
            subject_descriptor,
            container_descriptor,
        ],
        &[("api-version", GRAPH_API_VERSION)],
    )?;
    client.delete(url, "remove membership").await
}

/// Lists direct containments of a subject, one level down.
pub async fn list_direct_memberships(
    client: &AzdoClient,
    subject_descriptor: &str,
) -> Result<Vec<GraphMembership>, ApiError> {
    let url = client.graph_api_url(
        &["_apis", "graph", "memberships", subject_descriptor],
        &[
            ("direction", "down"),
            ("depth", "1"),
            ("api-version", GRAPH_API_VERSION),
        ],
    )?;

    let page = client
        .get_paged::<GraphMembership>(url, "list memberships")
        .await?;
    Ok(page.items)
}
