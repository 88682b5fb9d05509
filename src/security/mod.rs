//! Principal permissions over security namespaces.
//!
//! A [`SecurityNamespace`] handle owns the namespace id, the client, and the
//! namespace's action vocabulary (bit per action name), loaded eagerly at
//! construction. Permission resources translate between attribute-bag
//! permission maps (`action name -> Allow/Deny/NotSet`) and the allow/deny
//! bitmasks stored in access control entries.

pub mod tokens;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::api::{AzdoClient, security};
use crate::error::{ApiError, ProviderResult, SchemaError};
use crate::provider::resource_data::{AttrValue, ResourceData};
use crate::provider::schema::{AttrKind, AttributeSchema};

/// Namespace id for service endpoint permissions.
pub const SERVICE_ENDPOINTS_NAMESPACE_ID: &str = "49b48001-ca20-4adc-8111-5b60c903a50c";

/// Namespace id for git repository permissions.
pub const GIT_REPOSITORIES_NAMESPACE_ID: &str = "2e9eb7ed-3c0a-47d4-87c1-0ffdd275fd87";

/// State of one permission action for a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionType {
    /// No explicit decision stored.
    NotSet,
    /// Explicitly allowed on the token itself.
    Allow,
    /// Explicitly denied on the token itself.
    Deny,
    /// Effective through inheritance only; reported on read.
    Inherited,
}

impl FromStr for PermissionType {
    type Err = SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "notset" => Ok(Self::NotSet),
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            other => Err(SchemaError::InvalidValue {
                name: "permissions".to_string(),
                message: format!("'{other}' is not one of NotSet, Allow, Deny"),
            }),
        }
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::NotSet => "NotSet",
            Self::Allow => "Allow",
            Self::Deny => "Deny",
            Self::Inherited => "Inherited",
        };
        f.write_str(value)
    }
}

/// Permission states of one principal for a set of actions.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalPermission {
    /// Graph subject descriptor of the principal.
    pub subject_descriptor: String,
    /// Permission state per action name.
    pub permissions: BTreeMap<String, PermissionType>,
}

/// A pending permission write for one principal.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPrincipalPermission {
    /// Replace the stored entry instead of merging into it.
    pub replace: bool,
    /// The principal and the permission states to store.
    pub principal_permission: PrincipalPermission,
}

/// Handle to one security namespace with its action vocabulary.
pub struct SecurityNamespace {
    namespace_id: String,
    client: AzdoClient,
    actions: Vec<crate::api::models::ActionDefinition>,
}

impl SecurityNamespace {
    /// Creates a handle, loading the namespace's actions.
    pub async fn new(client: &AzdoClient, namespace_id: &str) -> ProviderResult<Self> {
        let description = security::get_security_namespace(client, namespace_id).await?;
        Ok(Self {
            namespace_id: namespace_id.to_string(),
            client: client.clone(),
            actions: description.actions,
        })
    }

    fn action_bit(&self, name: &str) -> Result<u32, SchemaError> {
        self.actions
            .iter()
            .find(|action| action.name.as_deref() == Some(name))
            .map(|action| action.bit)
            .ok_or_else(|| SchemaError::InvalidValue {
                name: "permissions".to_string(),
                message: format!("unknown permission '{name}' for this namespace"),
            })
    }

    /// Resolves graph subject descriptors to identity descriptors.
    ///
    /// ACEs are keyed by identity descriptors; returns pairs of
    /// (subject descriptor, identity descriptor) in input order.
    async fn resolve_principals(
        &self,
        subject_descriptors: &[String],
    ) -> ProviderResult<Vec<(String, String)>> {
        let identities =
            security::read_identities(&self.client, subject_descriptors).await?;

        let mut resolved = Vec::with_capacity(subject_descriptors.len());
        for subject in subject_descriptors {
            let identity = identities
                .iter()
                .find(|identity| identity.subject_descriptor.as_deref() == Some(subject.as_str()))
                .and_then(|identity| identity.descriptor.clone())
                .ok_or_else(|| ApiError::UnexpectedResponse {
                    message: format!("no identity found for principal [{subject}]"),
                })?;
            resolved.push((subject.clone(), identity));
        }
        Ok(resolved)
    }

    /// Writes permission states for the given principals on `acl_token`.
    pub async fn set_principal_permissions(
        &self,
        permissions: &[SetPrincipalPermission],
        acl_token: &str,
    ) -> ProviderResult<()> {
        let subjects: Vec<String> = permissions
            .iter()
            .map(|set| set.principal_permission.subject_descriptor.clone())
            .collect();
        let resolved = self.resolve_principals(&subjects).await?;

        for (set, (_, identity_descriptor)) in permissions.iter().zip(resolved) {
            let mut allow = 0u32;
            let mut deny = 0u32;
            for (action, permission) in &set.principal_permission.permissions {
                let bit = self.action_bit(action)?;
                match permission {
                    PermissionType::Allow => allow |= bit,
                    PermissionType::Deny => deny |= bit,
                    PermissionType::NotSet => {}
                    PermissionType::Inherited => {
                        return Err(SchemaError::InvalidValue {
                            name: "permissions".to_string(),
                            message: format!("'{action}' cannot be written as Inherited"),
                        }
                        .into());
                    }
                }
            }

            let entry = crate::api::models::AccessControlEntry {
                descriptor: Some(identity_descriptor),
                allow: Some(allow),
                deny: Some(deny),
                extended_info: None,
            };
            security::set_access_control_entries(
                &self.client,
                &self.namespace_id,
                acl_token,
                !set.replace,
                &[entry],
            )
            .await?;
        }

        Ok(())
    }

    /// Reads permission states of the given principals on `acl_token`.
    ///
    /// Every namespace action is reported; actions without a stored or
    /// effective bit come back as [`PermissionType::NotSet`].
    pub async fn get_principal_permissions(
        &self,
        acl_token: &str,
        principals: &[String],
    ) -> ProviderResult<Vec<PrincipalPermission>> {
        let resolved = self.resolve_principals(principals).await?;
        let identity_descriptors: Vec<String> = resolved
            .iter()
            .map(|(_, identity)| identity.clone())
            .collect();

        let acls = security::query_access_control_lists(
            &self.client,
            &self.namespace_id,
            acl_token,
            &identity_descriptors,
            true,
        )
        .await?;

        let mut results = Vec::with_capacity(resolved.len());
        for (subject, identity) in resolved {
            let ace = acls
                .iter()
                .find_map(|acl| acl.aces_dictionary.get(&identity));

            let mut permissions = BTreeMap::new();
            for action in &self.actions {
                let Some(name) = action.name.clone() else {
                    continue;
                };
                let permission = match ace {
                    None => PermissionType::NotSet,
                    Some(ace) => {
                        let allow = ace.allow.unwrap_or(0);
                        let deny = ace.deny.unwrap_or(0);
                        let effective = ace.extended_info.as_ref();
                        let effective_allow =
                            effective.and_then(|info| info.effective_allow).unwrap_or(0);
                        let effective_deny =
                            effective.and_then(|info| info.effective_deny).unwrap_or(0);

                        if allow & action.bit != 0 {
                            PermissionType::Allow
                        } else if deny & action.bit != 0 {
                            PermissionType::Deny
                        } else if (effective_allow | effective_deny) & action.bit != 0 {
                            PermissionType::Inherited
                        } else {
                            PermissionType::NotSet
                        }
                    }
                };
                permissions.insert(name, permission);
            }

            results.push(PrincipalPermission {
                subject_descriptor: subject,
                permissions,
            });
        }

        Ok(results)
    }
}

/// Shared attribute schema of every permission resource.
///
/// Extends `extra` with the principal, permission map, and replace flag.
#[must_use]
pub fn permission_schema(extra: Vec<AttributeSchema>) -> Vec<AttributeSchema> {
    let mut schema = vec![
        AttributeSchema::required("principal", AttrKind::String).force_new(),
        AttributeSchema::required("permissions", AttrKind::Map),
        AttributeSchema::optional("replace", AttrKind::Bool),
    ];
    schema.extend(extra);
    schema
}

/// Writes the permission states held in the attribute bag.
///
/// Fails fast when `principal` or `permissions` is absent. `force` overrides
/// every permission state (delete flows force NotSet) and `force_replace`
/// overrides the configured replace flag.
pub async fn set_principal_permissions(
    data: &ResourceData,
    namespace: &SecurityNamespace,
    acl_token: &str,
    force: Option<PermissionType>,
    force_replace: bool,
) -> ProviderResult<()> {
    let principal = data.require_string("principal")?;
    let permissions = data.require_map("permissions")?;

    let replace = if force_replace {
        true
    } else {
        data.get_bool("replace").unwrap_or(true)
    };

    let mut permission_map = BTreeMap::new();
    for (action, value) in permissions {
        let permission = match force {
            Some(forced) => forced,
            None => match value {
                AttrValue::String(value) => value.parse()?,
                _ => {
                    return Err(SchemaError::TypeMismatch {
                        name: format!("permissions.{action}"),
                        expected: "string",
                    }
                    .into());
                }
            },
        };
        permission_map.insert(action.clone(), permission);
    }

    let set_permissions = vec![SetPrincipalPermission {
        replace,
        principal_permission: PrincipalPermission {
            subject_descriptor: principal.to_string(),
            permissions: permission_map,
        },
    }];

    namespace
        .set_principal_permissions(&set_permissions, acl_token)
        .await
}

/// Reads current permission states for the principal in the attribute bag.
///
/// Sets the resource id to `{token}/{principal}` and prunes reported actions
/// down to those named in the configured permission map.
pub async fn get_principal_permissions(
    data: &mut ResourceData,
    namespace: &SecurityNamespace,
    acl_token: &str,
) -> ProviderResult<PrincipalPermission> {
    let principal = data.require_string("principal")?.to_string();
    let requested = data.require_map("permissions")?.clone();

    let principals = vec![principal.clone()];
    let mut permissions = namespace
        .get_principal_permissions(acl_token, &principals)
        .await?;

    if permissions.len() != 1 {
        return Err(ApiError::UnexpectedResponse {
            message: format!("failed to retrieve current permissions for principal [{principal}]"),
        }
        .into());
    }

    data.set_id(format!("{acl_token}/{principal}"));
    let mut result = permissions.remove(0);
    result
        .permissions
        .retain(|action, _| requested.contains_key(action));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Permission Type Parsing
    ///
    /// Tests string parsing of writable permission states.
    ///
    /// ## Test Scenario
    /// - Parses each writable state, case-insensitively, plus an invalid one
    ///
    /// ## Expected Outcome
    /// - Valid states parse; Inherited and junk are rejected
    #[test]
    fn test_permission_type_parsing() {
        assert_eq!("allow".parse::<PermissionType>().unwrap(), PermissionType::Allow);
        assert_eq!("Deny".parse::<PermissionType>().unwrap(), PermissionType::Deny);
        assert_eq!(
            "NOTSET".parse::<PermissionType>().unwrap(),
            PermissionType::NotSet
        );
        assert!("inherited".parse::<PermissionType>().is_err());
        assert!("maybe".parse::<PermissionType>().is_err());
    }

    /// # Permission Type Display
    ///
    /// Tests the canonical spelling of each state.
    ///
    /// ## Test Scenario
    /// - Formats every variant
    ///
    /// ## Expected Outcome
    /// - Pascal-case spellings matching the API vocabulary
    #[test]
    fn test_permission_type_display() {
        assert_eq!(PermissionType::NotSet.to_string(), "NotSet");
        assert_eq!(PermissionType::Allow.to_string(), "Allow");
        assert_eq!(PermissionType::Deny.to_string(), "Deny");
        assert_eq!(PermissionType::Inherited.to_string(), "Inherited");
    }

    /// # Permission Schema Shape
    ///
    /// Tests the shared permission resource schema builder.
    ///
    /// ## Test Scenario
    /// - Builds a schema with one extra attribute
    ///
    /// ## Expected Outcome
    /// - principal/permissions/replace precede the extras
    #[test]
    fn test_permission_schema() {
        let schema = permission_schema(vec![AttributeSchema::required(
            "project_id",
            AttrKind::String,
        )]);
        let names: Vec<&str> = schema.iter().map(|attr| attr.name).collect();
        assert_eq!(names, vec!["principal", "permissions", "replace", "project_id"]);
    }
}
