//! Kubernetes service endpoint.
//!
//! Supports three authorization types: AzureSubscription (AKS resource
//! lookup), Kubeconfig (raw kubeconfig YAML), and ServiceAccount (token plus
//! CA certificate).

use std::collections::BTreeMap;

use super::{EndpointKind, nested_string, secret_hash};
use crate::api::models::{EndpointAuthorization, ServiceEndpoint};
use crate::error::{ProviderResult, SchemaError};
use crate::provider::resource_data::{AttrMap, AttrValue, ResourceData};
use crate::provider::schema::{AttrKind, AttributeSchema};

/// Kubernetes endpoint with selectable authorization type.
pub struct KubernetesEndpoint;

/// Extracts the first context name out of a kubeconfig document.
fn default_cluster_context(kube_config: &str) -> ProviderResult<String> {
    let parsed: serde_yaml::Value =
        serde_yaml::from_str(kube_config).map_err(|err| SchemaError::InvalidValue {
            name: "kubeconfig.kube_config".to_string(),
            message: format!("contains invalid YAML: {err}"),
        })?;

    parsed
        .get("contexts")
        .and_then(|contexts| contexts.get(0))
        .and_then(|context| context.get("name"))
        .and_then(|name| name.as_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            SchemaError::InvalidValue {
                name: "kubeconfig.kube_config".to_string(),
                message: "no contexts declared".to_string(),
            }
            .into()
        })
}

impl EndpointKind for KubernetesEndpoint {
    const TYPE_NAME: &'static str = "azuredevops_serviceendpoint_kubernetes";

    fn extra_schema() -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::required("apiserver_url", AttrKind::String),
            AttributeSchema::required("authorization_type", AttrKind::String),
            AttributeSchema::optional("azure_subscription", AttrKind::Map),
            AttributeSchema::optional("kubeconfig", AttrKind::Map),
            AttributeSchema::optional("service_account", AttrKind::Map),
        ]
    }

    fn expand(data: &ResourceData, endpoint: &mut ServiceEndpoint) -> ProviderResult<()> {
        endpoint.endpoint_type = Some("kubernetes".to_string());
        endpoint.url = Some(data.require_string("apiserver_url")?.to_string());

        match data.require_string("authorization_type")? {
            "AzureSubscription" => {
                let block = data.require_map("azure_subscription")?;

                let mut parameters = BTreeMap::new();
                parameters.insert(
                    "azureEnvironment".to_string(),
                    block
                        .get("azure_environment")
                        .and_then(AttrValue::as_str)
                        .unwrap_or("AzureCloud")
                        .to_string(),
                );
                parameters.insert(
                    "azureTenantId".to_string(),
                    nested_string(block, "azure_subscription", "tenant_id")?.to_string(),
                );

                let subscription_id =
                    nested_string(block, "azure_subscription", "subscription_id")?;
                let resourcegroup_id =
                    nested_string(block, "azure_subscription", "resourcegroup_id")?;
                let cluster_name = nested_string(block, "azure_subscription", "cluster_name")?;
                let cluster_id = format!(
                    "/subscriptions/{subscription_id}/resourcegroups/{resourcegroup_id}/providers/Microsoft.ContainerService/managedClusters/{cluster_name}"
                );

                let mut data_map = BTreeMap::new();
                data_map.insert("authorizationType".to_string(), "AzureSubscription".to_string());
                data_map.insert("azureSubscriptionId".to_string(), subscription_id.to_string());
                data_map.insert(
                    "azureSubscriptionName".to_string(),
                    nested_string(block, "azure_subscription", "subscription_name")?.to_string(),
                );
                data_map.insert("clusterId".to_string(), cluster_id);
                data_map.insert(
                    "namespace".to_string(),
                    block
                        .get("namespace")
                        .and_then(AttrValue::as_str)
                        .unwrap_or("default")
                        .to_string(),
                );

                endpoint.authorization = Some(EndpointAuthorization {
                    scheme: Some("Kubernetes".to_string()),
                    parameters: Some(parameters),
                });
                endpoint.data = Some(data_map);
            }
            "Kubeconfig" => {
                let block = data.require_map("kubeconfig")?;
                let kube_config = nested_string(block, "kubeconfig", "kube_config")?;

                let cluster_context = match block
                    .get("cluster_context")
                    .and_then(AttrValue::as_str)
                    .filter(|context| !context.is_empty())
                {
                    Some(context) => context.to_string(),
                    None => default_cluster_context(kube_config)?,
                };

                let accept_untrusted_certs = block
                    .get("accept_untrusted_certs")
                    .and_then(AttrValue::as_bool)
                    .unwrap_or(true);

                let mut parameters = BTreeMap::new();
                parameters.insert("clusterContext".to_string(), cluster_context);
                parameters.insert("kubeconfig".to_string(), kube_config.to_string());

                let mut data_map = BTreeMap::new();
                data_map.insert("authorizationType".to_string(), "Kubeconfig".to_string());
                data_map.insert(
                    "acceptUntrustedCerts".to_string(),
                    accept_untrusted_certs.to_string(),
                );

                endpoint.authorization = Some(EndpointAuthorization {
                    scheme: Some("Kubernetes".to_string()),
                    parameters: Some(parameters),
                });
                endpoint.data = Some(data_map);
            }
            "ServiceAccount" => {
                let block = data.require_map("service_account")?;

                let mut parameters = BTreeMap::new();
                parameters.insert(
                    "apiToken".to_string(),
                    nested_string(block, "service_account", "token")?.to_string(),
                );
                parameters.insert(
                    "serviceAccountCertificate".to_string(),
                    block
                        .get("ca_cert")
                        .and_then(AttrValue::as_str)
                        .unwrap_or_default()
                        .to_string(),
                );

                let mut data_map = BTreeMap::new();
                data_map.insert("authorizationType".to_string(), "ServiceAccount".to_string());

                endpoint.authorization = Some(EndpointAuthorization {
                    scheme: Some("Token".to_string()),
                    parameters: Some(parameters),
                });
                endpoint.data = Some(data_map);
            }
            other => {
                return Err(SchemaError::InvalidValue {
                    name: "authorization_type".to_string(),
                    message: format!(
                        "'{other}' is not one of AzureSubscription, Kubeconfig, ServiceAccount"
                    ),
                }
                .into());
            }
        }

        Ok(())
    }

    fn flatten(data: &mut ResourceData, endpoint: &ServiceEndpoint) -> ProviderResult<()> {
        if let Some(url) = &endpoint.url {
            data.set("apiserver_url", url.as_str());
        }

        let endpoint_data = endpoint.data.clone().unwrap_or_default();
        let parameters = endpoint
            .authorization
            .as_ref()
            .and_then(|authorization| authorization.parameters.clone())
            .unwrap_or_default();

        let authorization_type = endpoint_data
            .get("authorizationType")
            .cloned()
            .unwrap_or_default();
        data.set("authorization_type", authorization_type.as_str());

        match authorization_type.as_str() {
            "AzureSubscription" => {
                // The cluster name and resource group are carried inside the
                // clusterId resource path.
                let cluster_id = endpoint_data.get("clusterId").cloned().unwrap_or_default();
                let segments: Vec<&str> = cluster_id.split('/').collect();
                let after = |marker: &str| -> String {
                    segments
                        .iter()
                        .position(|segment| *segment == marker)
                        .and_then(|index| segments.get(index + 1))
                        .map(|segment| (*segment).to_string())
                        .unwrap_or_default()
                };

                let mut block = AttrMap::new();
                block.insert(
                    "azure_environment".to_string(),
                    AttrValue::String(
                        parameters.get("azureEnvironment").cloned().unwrap_or_default(),
                    ),
                );
                block.insert(
                    "tenant_id".to_string(),
                    AttrValue::String(parameters.get("azureTenantId").cloned().unwrap_or_default()),
                );
                block.insert(
                    "subscription_id".to_string(),
                    AttrValue::String(
                        endpoint_data
                            .get("azureSubscriptionId")
                            .cloned()
                            .unwrap_or_default(),
                    ),
                );
                block.insert(
                    "subscription_name".to_string(),
                    AttrValue::String(
                        endpoint_data
                            .get("azureSubscriptionName")
                            .cloned()
                            .unwrap_or_default(),
                    ),
                );
                block.insert(
                    "resourcegroup_id".to_string(),
                    AttrValue::String(after("resourcegroups")),
                );
                block.insert(
                    "cluster_name".to_string(),
                    AttrValue::String(after("managedClusters")),
                );
                block.insert(
                    "namespace".to_string(),
                    AttrValue::String(endpoint_data.get("namespace").cloned().unwrap_or_default()),
                );
                data.set("azure_subscription", block);
            }
            "Kubeconfig" => {
                let accept_untrusted_certs = endpoint_data
                    .get("acceptUntrustedCerts")
                    .map(|value| value == "true")
                    .unwrap_or_default();

                // The kubeconfig itself is write-only; keep the configured
                // value and remember a hash for drift detection.
                let configured = data.get_map("kubeconfig").cloned().unwrap_or_default();
                let mut block = configured;
                if let Some(context) = parameters.get("clusterContext") {
                    block.insert(
                        "cluster_context".to_string(),
                        AttrValue::String(context.clone()),
                    );
                }
                block.insert(
                    "accept_untrusted_certs".to_string(),
                    AttrValue::Bool(accept_untrusted_certs),
                );
                if let Some(kube_config) = block
                    .get("kube_config")
                    .and_then(AttrValue::as_str)
                    .map(str::to_owned)
                {
                    block.insert(
                        "kube_config_hash".to_string(),
                        AttrValue::String(secret_hash(&kube_config)),
                    );
                }
                data.set("kubeconfig", block);
            }
            "ServiceAccount" => {
                let configured = data.get_map("service_account").cloned().unwrap_or_default();
                let mut block = configured;
                if let Some(token) = block
                    .get("token")
                    .and_then(AttrValue::as_str)
                    .map(str::to_owned)
                {
                    block.insert(
                        "token_hash".to_string(),
                        AttrValue::String(secret_hash(&token)),
                    );
                }
                data.set("service_account", block);
            }
            _ => {}
        }

        Ok(())
    }
}
