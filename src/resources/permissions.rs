//! Permission resources.
//!
//! Every permission resource follows the same lifecycle against a security
//! namespace: build the ACL token from the identifying attributes, then set
//! or get principal permissions through the namespace handle. Deleting
//! forces every configured action to NotSet with a replacing write.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::api::AzdoClient;
use crate::error::{ProviderResult, SchemaError};
use crate::provider::resource::Resource;
use crate::provider::resource_data::{AttrMap, AttrValue, ResourceData};
use crate::provider::schema::{AttrKind, AttributeSchema, validate_uuid};
use crate::security::{
    self, GIT_REPOSITORIES_NAMESPACE_ID, PermissionType, SERVICE_ENDPOINTS_NAMESPACE_ID,
    SecurityNamespace, tokens,
};

/// Token construction and schema for one permission resource.
pub trait PermissionTokenKind: Send + Sync + 'static {
    /// Resource type name, e.g. `azuredevops_serviceendpoint_permissions`.
    const TYPE_NAME: &'static str;

    /// Id of the security namespace the token lives in.
    const NAMESPACE_ID: &'static str;

    /// Identifying attributes beyond the shared permission schema.
    fn extra_schema() -> Vec<AttributeSchema>;

    /// Builds the ACL token from the identifying attributes.
    fn build_token(data: &ResourceData) -> ProviderResult<String>;
}

/// Generic lifecycle implementation over a [`PermissionTokenKind`].
pub struct PermissionResource<K: PermissionTokenKind> {
    schema: Vec<AttributeSchema>,
    _kind: PhantomData<K>,
}

impl<K: PermissionTokenKind> PermissionResource<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: security::permission_schema(K::extra_schema()),
            _kind: PhantomData,
        }
    }
}

impl<K: PermissionTokenKind> Default for PermissionResource<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: PermissionTokenKind> Resource for PermissionResource<K> {
    fn type_name(&self) -> &'static str {
        K::TYPE_NAME
    }

    fn schema(&self) -> &[AttributeSchema] {
        &self.schema
    }

    async fn create(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let acl_token = K::build_token(data)?;
        require_permission_inputs(data)?;
        let namespace = SecurityNamespace::new(client, K::NAMESPACE_ID).await?;

        security::set_principal_permissions(data, &namespace, &acl_token, None, false).await?;
        self.read(client, data).await
    }

    async fn read(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let acl_token = K::build_token(data)?;
        require_permission_inputs(data)?;
        let namespace = SecurityNamespace::new(client, K::NAMESPACE_ID).await?;

        let principal_permissions =
            security::get_principal_permissions(data, &namespace, &acl_token).await?;

        let permissions: AttrMap = principal_permissions
            .permissions
            .into_iter()
            .map(|(action, permission)| (action, AttrValue::String(permission.to_string())))
            .collect();
        data.set("permissions", permissions);
        Ok(())
    }

    async fn update(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        self.create(client, data).await
    }

    async fn delete(&self, client: &AzdoClient, data: &mut ResourceData) -> ProviderResult<()> {
        let acl_token = K::build_token(data)?;
        require_permission_inputs(data)?;
        let namespace = SecurityNamespace::new(client, K::NAMESPACE_ID).await?;

        security::set_principal_permissions(
            data,
            &namespace,
            &acl_token,
            Some(PermissionType::NotSet),
            true,
        )
        .await?;
        data.clear_id();
        Ok(())
    }
}

/// Required permission inputs are checked before any call leaves the process.
fn require_permission_inputs(data: &ResourceData) -> ProviderResult<()> {
    data.require_string("principal")?;
    data.require_map("permissions")?;
    Ok(())
}

/// Permissions on service endpoints, project-wide or per endpoint.
pub struct ServiceEndpointPermissions;

impl PermissionTokenKind for ServiceEndpointPermissions {
    const TYPE_NAME: &'static str = "azuredevops_serviceendpoint_permissions";
    const NAMESPACE_ID: &'static str = SERVICE_ENDPOINTS_NAMESPACE_ID;

    fn extra_schema() -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::required("project_id", AttrKind::String).force_new(),
            AttributeSchema::optional("service_endpoint_id", AttrKind::String).force_new(),
        ]
    }

    fn build_token(data: &ResourceData) -> ProviderResult<String> {
        let project_id = data.require_string("project_id")?;
        validate_uuid("project_id", project_id)?;

        let endpoint_id = data.get_string("service_endpoint_id");
        if let Some(endpoint_id) = endpoint_id {
            validate_uuid("service_endpoint_id", endpoint_id)?;
        }

        Ok(tokens::service_endpoint_token(project_id, endpoint_id))
    }
}

/// Permissions on git repositories, down to a single branch.
pub struct GitPermissions;

impl PermissionTokenKind for GitPermissions {
    const TYPE_NAME: &'static str = "azuredevops_git_permissions";
    const NAMESPACE_ID: &'static str = GIT_REPOSITORIES_NAMESPACE_ID;

    fn extra_schema() -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::required("project_id", AttrKind::String).force_new(),
            AttributeSchema::optional("repository_id", AttrKind::String).force_new(),
            AttributeSchema::optional("branch_name", AttrKind::String).force_new(),
        ]
    }

    fn build_token(data: &ResourceData) -> ProviderResult<String> {
        let project_id = data.require_string("project_id")?;
        validate_uuid("project_id", project_id)?;

        let repository_id = data.get_string("repository_id");
        if let Some(repository_id) = repository_id {
            validate_uuid("repository_id", repository_id)?;
        }

        let branch_name = data.get_string("branch_name");
        if branch_name.is_some() && repository_id.is_none() {
            return Err(SchemaError::InvalidValue {
                name: "branch_name".to_string(),
                message: "branch_name requires repository_id".to_string(),
            }
            .into());
        }

        Ok(tokens::repository_token(
            project_id,
            repository_id,
            branch_name,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = "11111111-2222-3333-4444-555555555555";
    const ENDPOINT: &str = "99999999-8888-7777-6666-555555555555";

    /// # Service Endpoint Token Scopes
    ///
    /// Tests the token built from the identifying attributes.
    ///
    /// ## Test Scenario
    /// - Builds tokens with and without a service endpoint id
    ///
    /// ## Expected Outcome
    /// - Without an endpoint the token covers all endpoints of the project
    #[test]
    fn test_service_endpoint_token_scopes() {
        let mut data = ResourceData::new();
        data.set("project_id", PROJECT);
        assert_eq!(
            ServiceEndpointPermissions::build_token(&data).unwrap(),
            format!("endpoints/{PROJECT}")
        );

        data.set("service_endpoint_id", ENDPOINT);
        assert_eq!(
            ServiceEndpointPermissions::build_token(&data).unwrap(),
            format!("endpoints/{PROJECT}/{ENDPOINT}")
        );
    }

    /// # Token Validation
    ///
    /// Tests fail-fast validation of the identifying attributes.
    ///
    /// ## Test Scenario
    /// - Builds tokens with a missing project, a malformed endpoint id, and
    ///   a branch without a repository
    ///
    /// ## Expected Outcome
    /// - Each case fails before any network call
    #[test]
    fn test_token_validation() {
        let data = ResourceData::new();
        assert!(ServiceEndpointPermissions::build_token(&data).is_err());

        let mut data = ResourceData::new();
        data.set("project_id", PROJECT);
        data.set("service_endpoint_id", "nope");
        assert!(ServiceEndpointPermissions::build_token(&data).is_err());

        let mut data = ResourceData::new();
        data.set("project_id", PROJECT);
        data.set("branch_name", "master");
        assert!(GitPermissions::build_token(&data).is_err());
    }

    /// # Fail Fast Without Principal
    ///
    /// Tests that permission writes validate inputs before any network call.
    ///
    /// ## Test Scenario
    /// - Creates permissions with a valid token scope but no principal,
    ///   against a client pointing at an unroutable address
    ///
    /// ## Expected Outcome
    /// - A schema error naming the principal; nothing is sent on the wire
    #[tokio::test]
    async fn test_create_requires_principal_before_network() {
        use secrecy::SecretString;

        let client = crate::api::AzdoClient::with_base_urls(
            "org",
            "http://127.0.0.1:1",
            "http://127.0.0.1:1",
            SecretString::from("pat".to_string()),
        );
        let resource = PermissionResource::<ServiceEndpointPermissions>::new();

        let mut data = ResourceData::new();
        data.set("project_id", PROJECT);

        let err = resource.create(&client, &mut data).await.unwrap_err();
        assert!(matches!(err, crate::error::ProviderError::Schema(_)));
        assert!(err.to_string().contains("principal"));
    }

    /// # Git Token Narrowing
    ///
    /// Tests repository and branch scopes of the git namespace token.
    ///
    /// ## Test Scenario
    /// - Builds project, repository, and branch scoped tokens
    ///
    /// ## Expected Outcome
    /// - Each present segment narrows the token
    #[test]
    fn test_git_token_narrowing() {
        let mut data = ResourceData::new();
        data.set("project_id", PROJECT);
        assert_eq!(
            GitPermissions::build_token(&data).unwrap(),
            format!("repoV2/{PROJECT}")
        );

        data.set("repository_id", ENDPOINT);
        assert_eq!(
            GitPermissions::build_token(&data).unwrap(),
            format!("repoV2/{PROJECT}/{ENDPOINT}")
        );

        data.set("branch_name", "master");
        let token = GitPermissions::build_token(&data).unwrap();
        assert!(token.starts_with(&format!("repoV2/{PROJECT}/{ENDPOINT}/refs/heads/")));
    }
}
