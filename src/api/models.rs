//! Typed models for the Azure DevOps REST payloads this crate touches.
//!
//! Responses populate fields sparsely depending on the endpoint and
//! requested detail level, so every field is optional. The absent-vs-empty
//! distinction is preserved exactly: a field missing from the payload stays
//! `None` and is never folded into an empty string.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FilterError;
use crate::filter::FieldAccessible;

/// Reference to a team project, as returned by the core projects API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProjectReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// A git repository within a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fork: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<TeamProjectReference>,
}

/// Result of resolving a storage key to a graph descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDescriptorResult {
    pub value: Option<String>,
}

/// A graph group (project or organization scoped).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A graph user (any origin: aad, msa, vsts, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_kind: Option<String>,
}

/// A containment relationship between two graph subjects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMembership {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_descriptor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_descriptor: Option<String>,
}

/// Creation context materializing a group from an external origin id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphGroupOriginIdCreationContext {
    pub origin_id: String,
}

/// Creation context materializing a group from a mail address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphGroupMailAddressCreationContext {
    pub mail_address: String,
}

/// Creation context for a brand new Azure DevOps group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphGroupVstsCreationContext {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One of the supported group creation strategies.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GraphGroupCreationContext {
    OriginId(GraphGroupOriginIdCreationContext),
    MailAddress(GraphGroupMailAddressCreationContext),
    Vsts(GraphGroupVstsCreationContext),
}

/// A JSON Patch operation, as consumed by the graph group update endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPatchOperation {
    pub op: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub value: serde_json::Value,
}

/// Authorization block of a service endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointAuthorization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,
}

/// A service endpoint (service connection) in a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<EndpointAuthorization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_ready: Option<bool>,
}

/// Authorization state of a protected project resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionResourceReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

/// Scope a feature state applies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributedFeatureSettingScope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setting_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_scoped: Option<bool>,
}

/// Enabled/disabled state of a contributed feature for one scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributedFeatureState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<ContributedFeatureSettingScope>,
}

/// Query for (and response carrying) feature states of one scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributedFeatureStateQuery {
    #[serde(default)]
    pub feature_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_states: Option<BTreeMap<String, ContributedFeatureState>>,
    #[serde(default)]
    pub scope_values: BTreeMap<String, String>,
}

/// A single permission bit of a security namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDefinition {
    pub bit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Description of a security namespace, including its action vocabulary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityNamespaceDescription {
    pub namespace_id: Option<Uuid>,
    pub name: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

/// Effective (inherited) permission bits reported alongside an ACE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AceExtendedInformation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_allow: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_deny: Option<u32>,
}

/// Allow/deny bit pair for one identity descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_info: Option<AceExtendedInformation>,
}

/// Access control list scoped by a token within a security namespace.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlList {
    pub token: Option<String>,
    #[serde(default)]
    pub inherit_permissions: Option<bool>,
    #[serde(default)]
    pub aces_dictionary: BTreeMap<String, AccessControlEntry>,
}

/// A legacy identity, resolved from a graph subject descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Option<String>,
    pub descriptor: Option<String>,
    pub subject_descriptor: Option<String>,
}

impl FieldAccessible for GraphUser {
    fn field(&self, name: &str) -> Result<Option<String>, FilterError> {
        let value = match name {
            "descriptor" => &self.descriptor,
            "display_name" => &self.display_name,
            "origin" => &self.origin,
            "origin_id" => &self.origin_id,
            "principal_name" => &self.principal_name,
            "mail_address" => &self.mail_address,
            "subject_kind" => &self.subject_kind,
            _ => return Ok(None),
        };
        Ok(value.clone())
    }
}

impl FieldAccessible for GraphGroup {
    fn field(&self, name: &str) -> Result<Option<String>, FilterError> {
        let value = match name {
            "descriptor" => &self.descriptor,
            "display_name" => &self.display_name,
            "origin" => &self.origin,
            "origin_id" => &self.origin_id,
            "principal_name" => &self.principal_name,
            "mail_address" => &self.mail_address,
            "domain" => &self.domain,
            _ => return Ok(None),
        };
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Sparse Deserialization
    ///
    /// Tests that partially populated payloads deserialize with None fields.
    ///
    /// ## Test Scenario
    /// - Parses a repository payload carrying only a name
    ///
    /// ## Expected Outcome
    /// - Present fields are Some, absent fields stay None (not empty strings)
    #[test]
    fn test_sparse_repository_payload() {
        let repo: GitRepository = serde_json::from_str(r#"{"name": "backend"}"#).unwrap();
        assert_eq!(repo.name.as_deref(), Some("backend"));
        assert_eq!(repo.ssh_url, None);
        assert_eq!(repo.size, None);
    }

    /// # Creation Context Serialization
    ///
    /// Tests the wire shape of the three group creation strategies.
    ///
    /// ## Test Scenario
    /// - Serializes each creation context variant
    ///
    /// ## Expected Outcome
    /// - Each variant serializes only its own camelCase field
    #[test]
    fn test_group_creation_context_serialization() {
        let ctx = GraphGroupCreationContext::OriginId(GraphGroupOriginIdCreationContext {
            origin_id: "abc-123".to_string(),
        });
        assert_eq!(
            serde_json::to_string(&ctx).unwrap(),
            r#"{"originId":"abc-123"}"#
        );

        let ctx = GraphGroupCreationContext::Vsts(GraphGroupVstsCreationContext {
            display_name: "Release Managers".to_string(),
            description: None,
        });
        assert_eq!(
            serde_json::to_string(&ctx).unwrap(),
            r#"{"displayName":"Release Managers"}"#
        );
    }

    /// # Endpoint Type Field Naming
    ///
    /// Tests that the reserved word `type` maps onto endpoint_type.
    ///
    /// ## Test Scenario
    /// - Round-trips a service endpoint through JSON
    ///
    /// ## Expected Outcome
    /// - The wire field is named "type"
    #[test]
    fn test_service_endpoint_type_rename() {
        let endpoint = ServiceEndpoint {
            endpoint_type: Some("github".to_string()),
            ..ServiceEndpoint::default()
        };
        let json = serde_json::to_string(&endpoint).unwrap();
        assert_eq!(json, r#"{"type":"github"}"#);
    }

    /// # Graph User Field Access
    ///
    /// Tests the FieldAccessible implementation used by the users data source.
    ///
    /// ## Test Scenario
    /// - Resolves present, absent, and unknown field names
    ///
    /// ## Expected Outcome
    /// - Present fields resolve to their value, the rest to None
    #[test]
    fn test_graph_user_field_access() {
        let user = GraphUser {
            principal_name: Some("user@example.com".to_string()),
            ..GraphUser::default()
        };

        assert_eq!(
            user.field("principal_name").unwrap(),
            Some("user@example.com".to_string())
        );
        assert_eq!(user.field("origin").unwrap(), None);
        assert_eq!(user.field("no_such_field").unwrap(), None);
    }
}
