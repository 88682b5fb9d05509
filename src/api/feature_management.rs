//! Feature management API: per-project feature toggles.

use super::client::AzdoClient;
use super::models::{ContributedFeatureState, ContributedFeatureStateQuery};
use crate::error::ApiError;

const FEATURE_API_VERSION: &str = "7.1-preview.1";

/// Queries the states of the given features for one project.
pub async fn query_feature_states(
    client: &AzdoClient,
    query: &ContributedFeatureStateQuery,
) -> Result<ContributedFeatureStateQuery, ApiError> {
    let url = client.org_api_url(
        &["_apis", "FeatureManagement", "FeatureStatesQuery"],
        &[("api-version", FEATURE_API_VERSION)],
    )?;
    client.post_json(url, query, "query feature states").await
}

/// Sets the state of one feature for the project scope.
pub async fn set_feature_state(
    client: &AzdoClient,
    project_id: &str,
    feature_id: &str,
    state: &ContributedFeatureState,
) -> Result<ContributedFeatureState, ApiError> {
    let url = client.org_api_url(
        &[
            "_apis",
            "FeatureManagement",
            "FeatureStates",
            "host",
            "project",
            project_id,
            feature_id,
        ],
        &[("api-version", FEATURE_API_VERSION)],
    )?;
    client
        .patch_plain_json(url, state, "set feature state")
        .await
}
