//! # azdo-provider
//!
//! A library of resource and data-source definitions mapping attribute state
//! to the Azure DevOps REST API. This library provides:
//!
//! - A PAT-authenticated REST client with continuation-token pagination
//! - Resource definitions (groups, memberships, project features, service
//!   endpoints, permissions) with create/read/update/delete lifecycles
//! - Data sources (projects, repositories, groups, users) with generic
//!   attribute filtering
//! - Security-namespace permission handling over ACL tokens
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use azdo_provider::{Provider, ProviderConfig};
//! use azdo_provider::provider::ResourceData;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Resolve configuration from file and environment
//! let config = ProviderConfig::load_from_file()?.merge(ProviderConfig::load_from_env());
//! let provider = Provider::new(&config)?;
//!
//! // Read the projects data source
//! let mut data = ResourceData::new();
//! provider.read_data_source("azuredevops_projects", &mut data).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod filter;
pub mod logging;
pub mod provider;
pub mod resources;
pub mod security;
pub mod utils;

// Re-export commonly used types for convenience
pub use api::AzdoClient;
pub use config::ProviderConfig;
pub use provider::Provider;

/// Core result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
