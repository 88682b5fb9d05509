//! Configuration management for azdo-provider.
//!
//! This module handles loading configuration from multiple sources:
//! - TOML configuration files following XDG Base Directory specification
//! - Environment variables (`AZDO_ORG_SERVICE_URL`, `AZDO_PERSONAL_ACCESS_TOKEN`)
//!
//! ## Example
//!
//! ```rust
//! use azdo_provider::ProviderConfig;
//!
//! // Load configuration from file, with fallback to defaults
//! let config = ProviderConfig::load_from_file().unwrap();
//!
//! // Load from environment variables
//! let env_config = ProviderConfig::load_from_env();
//!
//! // Merge configurations (env takes precedence)
//! let merged = config.merge(env_config);
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable carrying the organization service URL.
pub const ENV_ORG_SERVICE_URL: &str = "AZDO_ORG_SERVICE_URL";

/// Environment variable carrying the personal access token.
pub const ENV_PERSONAL_ACCESS_TOKEN: &str = "AZDO_PERSONAL_ACCESS_TOKEN";

/// Provider configuration assembled from config file and environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The url of the Azure DevOps organization, e.g.
    /// `https://dev.azure.com/my-org`.
    pub org_service_url: Option<String>,
    /// The personal access token used for authentication.
    pub personal_access_token: Option<String>,
}

impl ProviderConfig {
    /// Load configuration from the XDG config directory.
    ///
    /// A missing config file is not an error; it yields the default
    /// (empty) configuration.
    #[must_use = "this returns the loaded configuration which should be used"]
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path).map_err(|err| {
            ConfigError::FileReadError {
                path: config_path.clone(),
                message: err.to_string(),
            }
        })?;

        let config = toml::from_str(&contents).map_err(|err| ConfigError::ParseError {
            path: config_path,
            message: err.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    #[must_use]
    pub fn load_from_env() -> Self {
        Self {
            org_service_url: std::env::var(ENV_ORG_SERVICE_URL).ok(),
            personal_access_token: std::env::var(ENV_PERSONAL_ACCESS_TOKEN).ok(),
        }
    }

    /// Merge two configurations; fields set in `other` take precedence.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            org_service_url: other.org_service_url.or(self.org_service_url),
            personal_access_token: other
                .personal_access_token
                .or(self.personal_access_token),
        }
    }

    /// Returns the resolved organization URL and token, or a descriptive
    /// error naming the missing field and its environment variable.
    pub fn resolved(&self) -> Result<(String, String), ConfigError> {
        let org_service_url =
            self.org_service_url
                .clone()
                .filter(|url| !url.is_empty())
                .ok_or_else(|| ConfigError::MissingRequired {
                    field: "org_service_url".to_string(),
                    env_var: ENV_ORG_SERVICE_URL.to_string(),
                })?;
        let personal_access_token = self
            .personal_access_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "personal_access_token".to_string(),
                env_var: ENV_PERSONAL_ACCESS_TOKEN.to_string(),
            })?;

        Ok((org_service_url, personal_access_token))
    }

    /// Path of the TOML configuration file.
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("azdo-provider").join("config.toml"))
    }
}
