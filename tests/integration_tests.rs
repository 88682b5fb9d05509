//! Integration tests for the azdo-provider library
//!
//! These tests demonstrate how to use the library APIs and verify
//! end-to-end assembly without network access.

use azdo_provider::api::AzdoClient;
use azdo_provider::filter::{AttributeComparison, filter_by_attributes};
use azdo_provider::provider::{AttrValue, ResourceData};
use azdo_provider::security::tokens;
use azdo_provider::{Provider, ProviderConfig};
use secrecy::SecretString;

#[test]
fn test_config_loading_and_merging() {
    // Test that config loading doesn't panic and returns sensible defaults
    let _config = ProviderConfig::load_from_file().expect("Should load config or return defaults");

    // Test environment config
    let env_config = ProviderConfig::load_from_env();

    // Test merging - create a test config with known values to merge
    let base = ProviderConfig {
        org_service_url: Some("https://dev.azure.com/test-org".to_string()),
        personal_access_token: Some("test-pat".to_string()),
    };
    let merged = base.merge(env_config);

    // Fields not set in the environment keep the base values
    assert!(merged.org_service_url.is_some());
    assert!(merged.personal_access_token.is_some());
}

#[test]
fn test_provider_assembly() {
    let config = ProviderConfig {
        org_service_url: Some("https://dev.azure.com/test-org".to_string()),
        personal_access_token: Some("test-pat".to_string()),
    };

    let provider = Provider::new(&config).expect("Provider should assemble");
    assert_eq!(provider.client().organization(), "test-org");

    // Every registered definition is reachable by its type name
    assert!(provider.resource("azuredevops_group").is_some());
    assert!(provider.data_source("azuredevops_projects").is_some());
    assert!(provider.resource("azuredevops_nonexistent").is_none());
}

#[test]
fn test_provider_requires_connection_settings() {
    let err = Provider::new(&ProviderConfig::default())
        .err()
        .expect("empty config must fail");
    assert!(err.to_string().contains("org_service_url"));
}

#[test]
fn test_client_creation() {
    let client = AzdoClient::new(
        "https://dev.azure.com/test-org",
        SecretString::from("test-pat".to_string()),
    )
    .expect("client should build");

    assert_eq!(client.organization(), "test-org");
}

#[test]
fn test_attribute_filter_through_public_api() {
    let mut first = std::collections::BTreeMap::new();
    first.insert("name".to_string(), AttrValue::String("Alpha".to_string()));
    let mut second = std::collections::BTreeMap::new();
    second.insert("name".to_string(), AttrValue::String("beta".to_string()));

    let records = vec![first, second];

    // Identity law: no comparisons returns the input unchanged
    let unchanged = filter_by_attributes(records.clone(), &[]).unwrap();
    assert_eq!(unchanged.len(), 2);

    // Case-insensitive narrowing
    let filtered = filter_by_attributes(
        records,
        &[AttributeComparison::new("name", "ALPHA").ignore_case()],
    )
    .unwrap();
    assert_eq!(filtered.len(), 1);
}

#[test]
fn test_acl_token_shapes() {
    assert_eq!(tokens::service_endpoint_token("P", None), "endpoints/P");
    assert_eq!(tokens::service_endpoint_token("P", Some("E")), "endpoints/P/E");
    assert!(tokens::repository_token("P", Some("R"), Some("main")).starts_with("repoV2/P/R/refs/heads/"));
}

#[test]
fn test_resource_data_round_trip() {
    let mut data = ResourceData::new();
    data.set("project_id", "11111111-2222-3333-4444-555555555555");
    data.set("authorized", true);
    data.set_id("res-1");

    assert_eq!(data.id(), Some("res-1"));
    assert_eq!(
        data.get_string("project_id"),
        Some("11111111-2222-3333-4444-555555555555")
    );
    assert_eq!(data.get_bool("authorized"), Some(true));
}

#[test]
fn test_logging_to_file() {
    use azdo_provider::logging::{LogConfig, LogFormat, LogLevel, init_logging};

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("provider.log");

    let guard = init_logging(LogConfig {
        level: Some(LogLevel::Debug),
        file: Some(path.clone()),
        format: LogFormat::Text,
    });
    assert!(guard.is_some());

    tracing::debug!("log line from integration test");
    drop(guard);

    assert!(path.exists());
}

#[test]
fn test_library_version() {
    // Test that version constant is accessible
    let version = azdo_provider::VERSION;
    assert!(!version.is_empty());
    assert!(version.contains('.'));
}
