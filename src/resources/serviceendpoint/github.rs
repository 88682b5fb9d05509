//! GitHub service endpoint.

use std::collections::BTreeMap;

use super::{EndpointKind, nested_string, secret_hash};
use crate::api::models::{EndpointAuthorization, ServiceEndpoint};
use crate::error::ProviderResult;
use crate::provider::resource_data::{AttrMap, AttrValue, ResourceData};
use crate::provider::schema::{AttrKind, AttributeSchema};
use crate::utils::eq_fold;

/// GitHub endpoint: PAT, OAuth, or app installation token authorization.
pub struct GitHubEndpoint;

impl EndpointKind for GitHubEndpoint {
    const TYPE_NAME: &'static str = "azuredevops_serviceendpoint_github";

    fn extra_schema() -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::optional("auth_personal", AttrKind::Map)
                .conflicts_with(&["auth_oauth"]),
            AttributeSchema::optional("auth_oauth", AttrKind::Map)
                .conflicts_with(&["auth_personal"]),
        ]
    }

    fn expand(data: &ResourceData, endpoint: &mut ServiceEndpoint) -> ProviderResult<()> {
        let mut scheme = "InstallationToken".to_string();
        let mut parameters: BTreeMap<String, String> = BTreeMap::new();

        if let Some(auth_personal) = data.get_map("auth_personal") {
            scheme = "PersonalAccessToken".to_string();
            parameters.insert(
                "accessToken".to_string(),
                nested_string(auth_personal, "auth_personal", "personal_access_token")?
                    .to_string(),
            );
        } else if let Some(auth_oauth) = data.get_map("auth_oauth") {
            scheme = "OAuth".to_string();
            parameters.insert(
                "ConfigurationId".to_string(),
                nested_string(auth_oauth, "auth_oauth", "oauth_configuration_id")?.to_string(),
            );
        }

        endpoint.authorization = Some(EndpointAuthorization {
            scheme: Some(scheme),
            parameters: Some(parameters),
        });
        endpoint.endpoint_type = Some("github".to_string());
        endpoint.url = Some("http://github.com".to_string());
        Ok(())
    }

    fn flatten(data: &mut ResourceData, endpoint: &ServiceEndpoint) -> ProviderResult<()> {
        let scheme = endpoint
            .authorization
            .as_ref()
            .and_then(|authorization| authorization.scheme.as_deref())
            .unwrap_or_default();

        if eq_fold(scheme, "OAuth") {
            let configuration_id = endpoint
                .authorization
                .as_ref()
                .and_then(|authorization| authorization.parameters.as_ref())
                .and_then(|parameters| parameters.get("ConfigurationId"))
                .cloned()
                .unwrap_or_default();

            let mut auth_oauth = AttrMap::new();
            auth_oauth.insert(
                "oauth_configuration_id".to_string(),
                AttrValue::String(configuration_id),
            );
            data.set("auth_oauth", auth_oauth);
        }

        if eq_fold(scheme, "PersonalAccessToken") {
            // The API never echoes the token back; keep the configured value
            // and remember its hash so configuration drift is visible.
            if let Some(auth_personal) = data.get_map("auth_personal").cloned() {
                let mut auth_personal = auth_personal;
                if let Some(token) = auth_personal
                    .get("personal_access_token")
                    .and_then(AttrValue::as_str)
                    .map(str::to_owned)
                {
                    auth_personal.insert(
                        "personal_access_token_hash".to_string(),
                        AttrValue::String(secret_hash(&token)),
                    );
                }
                data.set("auth_personal", auth_personal);
            }
        }

        Ok(())
    }
}
