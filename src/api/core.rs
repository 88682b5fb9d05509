//! Core API: team projects.

use super::client::{API_VERSION, AzdoClient};
use super::models::TeamProjectReference;
use super::pagination::{self, Page};
use crate::error::ApiError;
use crate::utils::eq_fold;

/// Fetches one page of projects matching `state_filter`.
async fn project_page(
    client: AzdoClient,
    state_filter: String,
    token: String,
) -> Result<Page<TeamProjectReference>, ApiError> {
    let mut query = vec![
        ("stateFilter", state_filter.as_str()),
        ("api-version", API_VERSION),
    ];
    if !token.is_empty() {
        query.push(("continuationToken", token.as_str()));
    }

    let url = client.org_api_url(&["_apis", "projects"], &query)?;
    client.get_paged(url, "list projects").await
}

/// Lists every project in the organization matching `state_filter`.
pub async fn list_projects(
    client: &AzdoClient,
    state_filter: &str,
) -> Result<Vec<TeamProjectReference>, ApiError> {
    pagination::collect_all(|token| project_page(client.clone(), state_filter.to_string(), token))
        .await
}

/// Finds a project by name (case-insensitive), stopping at the first match.
pub async fn find_project_by_name(
    client: &AzdoClient,
    state_filter: &str,
    name: &str,
) -> Result<Option<TeamProjectReference>, ApiError> {
    pagination::find_first(
        |token| project_page(client.clone(), state_filter.to_string(), token),
        |project| {
            project
                .name
                .as_deref()
                .is_some_and(|candidate| eq_fold(candidate, name))
        },
    )
    .await
}
