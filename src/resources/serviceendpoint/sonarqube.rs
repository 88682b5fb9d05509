//! Sonarqube service endpoint.

use std::collections::BTreeMap;

use super::{EndpointKind, secret_hash};
use crate::api::models::{EndpointAuthorization, ServiceEndpoint};
use crate::error::ProviderResult;
use crate::provider::resource_data::ResourceData;
use crate::provider::schema::{AttrKind, AttributeSchema};

/// Sonarqube endpoint: user token presented as the Basic auth username.
pub struct SonarqubeEndpoint;

impl EndpointKind for SonarqubeEndpoint {
    const TYPE_NAME: &'static str = "azuredevops_serviceendpoint_sonarqube";

    fn extra_schema() -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::required("url", AttrKind::String),
            AttributeSchema::required("token", AttrKind::String),
            AttributeSchema::computed("token_hash", AttrKind::String),
        ]
    }

    fn expand(data: &ResourceData, endpoint: &mut ServiceEndpoint) -> ProviderResult<()> {
        let mut parameters = BTreeMap::new();
        parameters.insert(
            "username".to_string(),
            data.require_string("token")?.to_string(),
        );

        endpoint.authorization = Some(EndpointAuthorization {
            scheme: Some("UsernamePassword".to_string()),
            parameters: Some(parameters),
        });
        endpoint.endpoint_type = Some("sonarqube".to_string());
        endpoint.url = Some(data.require_string("url")?.to_string());
        Ok(())
    }

    fn flatten(data: &mut ResourceData, endpoint: &ServiceEndpoint) -> ProviderResult<()> {
        if let Some(url) = &endpoint.url {
            data.set("url", url.as_str());
        }
        // The token itself is write-only; remember its hash instead.
        if let Some(token) = data.get_string("token").map(str::to_owned) {
            data.set("token_hash", secret_hash(&token));
        }
        Ok(())
    }
}
