//! Git API: repositories.

use super::client::{API_VERSION, AzdoClient};
use super::models::GitRepository;
use crate::error::ApiError;

/// Lists repositories, optionally scoped to one project.
pub async fn list_repositories(
    client: &AzdoClient,
    project: Option<&str>,
    include_hidden: bool,
) -> Result<Vec<GitRepository>, ApiError> {
    let include_hidden = if include_hidden { "true" } else { "false" };
    let query = [
        ("includeHidden", include_hidden),
        ("api-version", API_VERSION),
    ];

    let url = match project {
        Some(project) => {
            client.org_api_url(&[project, "_apis", "git", "repositories"], &query)?
        }
        None => client.org_api_url(&["_apis", "git", "repositories"], &query)?,
    };

    let page = client
        .get_paged::<GitRepository>(url, "list repositories")
        .await?;
    Ok(page.items)
}

/// Fetches a single repository by name or id within a project.
pub async fn get_repository(
    client: &AzdoClient,
    project: &str,
    name_or_id: &str,
) -> Result<GitRepository, ApiError> {
    let url = client.org_api_url(
        &[project, "_apis", "git", "repositories", name_or_id],
        &[("api-version", API_VERSION)],
    )?;
    client.get_json(url, "get repository").await
}
