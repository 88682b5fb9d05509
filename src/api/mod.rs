//! Azure DevOps REST API layer.
//!
//! This module provides the typed client used by every resource and data
//! source, plus per-area request functions and the pagination collectors.
//!
//! ## Features
//!
//! - PAT-authenticated requests over the organization and vssps endpoints
//! - Continuation-token pagination with protocol-violation detection
//! - Typed models for the payloads the provider touches
//!
//! ## Example
//!
//! ```rust,no_run
//! use azdo_provider::api::{AzdoClient, core};
//! use secrecy::SecretString;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AzdoClient::new(
//!     "https://dev.azure.com/my-org",
//!     SecretString::from("my-pat".to_string()),
//! )?;
//!
//! let projects = core::list_projects(&client, "wellFormed").await?;
//! println!("Found {} projects", projects.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod credential;

pub mod build;
pub mod core;
pub mod feature_management;
pub mod git;
pub mod graph;
pub mod models;
pub mod pagination;
pub mod security;
pub mod service_endpoint;

pub use client::AzdoClient;
pub use credential::PatCredential;
pub use pagination::Page;
