//! Security API: namespaces, access control lists, and identities.

use serde::{Deserialize, Serialize};

use super::client::{API_VERSION, AzdoClient};
use super::models::{AccessControlEntry, AccessControlList, Identity, SecurityNamespaceDescription};
use crate::error::ApiError;

#[derive(Deserialize)]
struct Collection<T> {
    #[serde(default)]
    value: Vec<T>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetAccessControlEntriesRequest<'a> {
    token: &'a str,
    merge: bool,
    access_control_entries: &'a [AccessControlEntry],
}

/// Fetches the description of a security namespace, including its actions.
pub async fn get_security_namespace(
    client: &AzdoClient,
    namespace_id: &str,
) -> Result<SecurityNamespaceDescription, ApiError> {
    let url = client.org_api_url(
        &["_apis", "securitynamespaces", namespace_id],
        &[("api-version", API_VERSION)],
    )?;

    let collection: Collection<SecurityNamespaceDescription> =
        client.get_json(url, "get security namespace").await?;
    collection
        .value
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::UnexpectedResponse {
            message: format!("security namespace {namespace_id} not found"),
        })
}

/// Queries access control lists for a token within a namespace.
pub async fn query_access_control_lists(
    client: &AzdoClient,
    namespace_id: &str,
    token: &str,
    descriptors: &[String],
    include_extended_info: bool,
) -> Result<Vec<AccessControlList>, ApiError> {
    let descriptors = descriptors.join(",");
    let include_extended_info = if include_extended_info { "true" } else { "false" };
    let mut query = vec![
        ("token", token),
        ("includeExtendedInfo", include_extended_info),
        ("api-version", API_VERSION),
    ];
    if !descriptors.is_empty() {
        query.push(("descriptors", descriptors.as_str()));
    }

    let url = client.org_api_url(&["_apis", "accesscontrollists", namespace_id], &query)?;
    let collection: Collection<AccessControlList> =
        client.get_json(url, "query access control lists").await?;
    Ok(collection.value)
}

/// Sets access control entries for a token within a namespace.
///
/// `merge` controls replace-vs-merge semantics: when false, the entries
/// replace whatever is currently stored for each descriptor.
pub async fn set_access_control_entries(
    client: &AzdoClient,
    namespace_id: &str,
    token: &str,
    merge: bool,
    entries: &[AccessControlEntry],
) -> Result<Vec<AccessControlEntry>, ApiError> {
    let url = client.org_api_url(
        &["_apis", "accesscontrolentries", namespace_id],
        &[("api-version", API_VERSION)],
    )?;

    let request = SetAccessControlEntriesRequest {
        token,
        merge,
        access_control_entries: entries,
    };
    let collection: Collection<AccessControlEntry> = client
        .post_json(url, &request, "set access control entries")
        .await?;
    Ok(collection.value)
}

/// Resolves graph subject descriptors to legacy identities.
///
/// ACL entries are keyed by identity descriptors, not graph descriptors,
/// so permission operations resolve their principals through this call.
pub async fn read_identities(
    client: &AzdoClient,
    subject_descriptors: &[String],
) -> Result<Vec<Identity>, ApiError> {
    let descriptors = subject_descriptors.join(",");
    let url = client.graph_api_url(
        &["_apis", "identities"],
        &[
            ("subjectDescriptors", descriptors.as_str()),
            ("queryMembership", "None"),
            ("api-version", API_VERSION),
        ],
    )?;

    let collection: Collection<Identity> = client.get_json(url, "read identities").await?;
    Ok(collection.value)
}
