//! Project features resource.
//!
//! Toggles the built-in feature areas (boards, repositories, pipelines,
//! test plans, artifacts) of a project. The feature-name table is a fixed,
//! explicitly constructed mapping; both lookup directions work off the same
//! table.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::api::models::{
    ContributedFeatureSettingScope, ContributedFeatureState, ContributedFeatureStateQuery,
};
use crate::api::{AzdoClient, feature_management};
use crate::error::{ProviderResult, SchemaError};
use crate::provider::resource::Resource;
use crate::provider::resource_data::{AttrMap, AttrValue, ResourceData};
use crate::provider::schema::{AttrKind, AttributeSchema, validate_uuid};

/// Feature name to contributed feature id.
const FEATURES: &[(&str, &str)] = &[
    ("boards", "ms.vss-work.agile"),
    ("repositories", "ms.vss-code.version-control"),
    ("pipelines", "ms.vss-build.pipelines"),
    ("testplans", "ms.vss-test-web.test"),
    ("artifacts", "ms.feed.feed"),
];

const STATE_ENABLED: &str = "enabled";
const STATE_DISABLED: &str = "disabled";

/// Resolves a feature name to its contributed feature id.
fn feature_id(name: &str) -> Option<&'static str> {
    FEATURES
        .iter()
        .find(|(feature, _)| *feature == name)
        .map(|(_, id)| *id)
}

/// Resolves a contributed feature id back to its feature name.
fn feature_name(id: &str) -> Option<&'static str> {
    FEATURES
        .iter()
        .find(|(_, feature_id)| *feature_id == id)
        .map(|(feature, _)| *feature)
}

/// The `azuredevops_project_features` resource.
pub struct ProjectFeaturesResource {
    schema: Vec<AttributeSchema>,
}

impl ProjectFeaturesResource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: vec![
                AttributeSchema::required("project_id", AttrKind::String).force_new(),
                AttributeSchema::required("features", AttrKind::Map),
            ],
        }
    }
}

impl Default for ProjectFeaturesResource {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates feature names and states before any network call.
fn validate_features(features: &AttrMap) -> Result<BTreeMap<String, String>, SchemaError> {
    let mut validated = BTreeMap::new();
    for (feature, state) in features {
        let feature = feature.to_lowercase();
        if feature_id(&feature).is_none() {
            return Err(SchemaError::InvalidValue {
                name: "features".to_string(),
                message: format!("unknown feature: {feature}"),
            });
        }

        let Some(state) = state.as_str() else {
            return Err(SchemaError::TypeMismatch {
                name: format!("features.{feature}"),
                expected: "string",
            });
        };
        if state != STATE_ENABLED && state != STATE_DISABLED {
            return Err(SchemaError::InvalidValue {
                name: "features".to_string(),
                message: format!("invalid state: {state}"),
            });
        }

        validated.insert(feature, state.to_string());
    }
    Ok(validated)
}

/// Applies the requested state to each feature for the project scope.
async fn set_feature_states(
    client: &AzdoClient,
    project_id: &str,
    states: &BTreeMap<String, String>,
) -> ProviderResult<()> {
    for (feature, state) in states {
        let id = feature_id(feature).ok_or_else(|| SchemaError::InvalidValue {
            name: "features".to_string(),
            message: format!("unknown feature: {feature}"),
        })?;

        let body = ContributedFeatureState {
            feature_id: Some(id.to_string()),
            state: Some(state.clone()),
            scope: Some(ContributedFeatureSettingScope {
                setting_scope: Some("project".to_string()),
                user_scoped: Some(false),
            }),
        };
        feature_management::set_feature_state(client, project_id, id, &body).await?;
        tracing::debug!(feature = %feature, state = %state, project_id, "set feature state");
    }
    Ok(())
}

/// Reads the current state of every managed feature for the project.
async fn read_feature_states(
    client: &AzdoClient,
    project_id: &str,
) -> ProviderResult<BTreeMap<String, String>> {
    let query = ContributedFeatureStateQuery {
        feature_ids: FEATURES.iter().map(|(_, id)| (*id).to_string()).collect(),
        feature_states: None,
        scope_values: BTreeMap::from([("project".to_string(), project_id.to_string())]),
    };

    let result = feature_management::query_feature_states(client, &query).await?;

    let mut states = BTreeMap::new();
    for (id, state) in result.feature_states.unwrap_or_default() {
        let (Some(feature), Some(state)) = (feature_name(&id), state.state) else {
            continue;
        };
        states.insert(feature.to_string(), state);
    }
    Ok(states)
}

#[async_trait]
impl Resource for ProjectFeaturesResource {
    fn type_name(&self) -> &'static str {
        "azuredevops_project_features"
    }

    fn schema(&self) -> &[AttributeSchema] {
        &self.schema
    }

    async fn create(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let project_id = data.require_string("project_id")?.to_string();
        validate_uuid("project_id", &project_id)?;
        let states = validate_features(data.require_map("features")?)?;

        set_feature_states(client, &project_id, &states).await?;
        data.set_id(project_id.as_str());
        self.read(client, data).await
    }

    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let project_id = data.require_string("project_id")?.to_string();
        let managed = data.require_map("features")?.clone();

        let mut current = read_feature_states(client, &project_id).await?;
        // Report only the features this resource manages.
        current.retain(|feature, _| managed.contains_key(feature));

        let features: AttrMap = current
            .into_iter()
            .map(|(feature, state)| (feature, AttrValue::String(state)))
            .collect();
        data.set("features", features);
        Ok(())
    }

    async fn update(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        self.create(client, data).await
    }

    async fn delete(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let project_id = data.require_string("project_id")?.to_string();
        let managed = validate_features(data.require_map("features")?)?;

        // Walking away from management re-enables every managed feature.
        let restore: BTreeMap<String, String> = managed
            .into_keys()
            .map(|feature| (feature, STATE_ENABLED.to_string()))
            .collect();
        set_feature_states(client, &project_id, &restore).await?;

        data.clear_id();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Feature Table Lookups
    ///
    /// Tests both directions of the fixed feature table.
    ///
    /// ## Test Scenario
    /// - Resolves names to ids and ids back to names
    ///
    /// ## Expected Outcome
    /// - Every known feature round-trips; unknown inputs return None
    #[test]
    fn test_feature_table() {
        assert_eq!(feature_id("boards"), Some("ms.vss-work.agile"));
        assert_eq!(feature_name("ms.feed.feed"), Some("artifacts"));
        for (name, id) in FEATURES {
            assert_eq!(feature_id(name), Some(*id));
            assert_eq!(feature_name(id), Some(*name));
        }
        assert_eq!(feature_id("wiki"), None);
        assert_eq!(feature_name("ms.vss-wiki.wiki"), None);
    }

    /// # Feature Validation
    ///
    /// Tests rejection of unknown features and invalid states.
    ///
    /// ## Test Scenario
    /// - Validates maps with a good entry, a bad feature, and a bad state
    ///
    /// ## Expected Outcome
    /// - Names are lower-cased; bad entries produce descriptive errors
    #[test]
    fn test_validate_features() {
        let mut features = AttrMap::new();
        features.insert("Boards".to_string(), AttrValue::String("enabled".to_string()));
        let validated = validate_features(&features).unwrap();
        assert_eq!(validated.get("boards").map(String::as_str), Some("enabled"));

        let mut features = AttrMap::new();
        features.insert("wiki".to_string(), AttrValue::String("enabled".to_string()));
        assert!(validate_features(&features)
            .unwrap_err()
            .to_string()
            .contains("unknown feature"));

        let mut features = AttrMap::new();
        features.insert("boards".to_string(), AttrValue::String("on".to_string()));
        assert!(validate_features(&features)
            .unwrap_err()
            .to_string()
            .contains("invalid state"));
    }
}
