//! Unified error handling for the azdo-provider library.
//!
//! This module provides a comprehensive error hierarchy using `thiserror` for better
//! programmatic error handling and more informative error messages.
//!
//! ## Error Categories
//!
//! - [`ApiError`]: Errors from Azure DevOps REST API interactions
//! - [`ConfigError`]: Errors from configuration loading and validation
//! - [`SchemaError`]: Errors from attribute-bag validation
//! - [`FilterError`]: Contract violations in the generic attribute filter
//!
//! ## Example
//!
//! ```rust,no_run
//! use azdo_provider::error::{ProviderError, ApiError};
//!
//! fn example() -> Result<(), ProviderError> {
//!     // Errors are automatically converted via From trait
//!     Err(ApiError::Unauthorized)?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the azdo-provider library.
///
/// This enum encompasses all possible errors that can occur during
/// resource lifecycle operations, API calls, and configuration handling.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// An error occurred while interacting with the Azure DevOps API.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// An error occurred while loading or validating configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An attribute bag did not satisfy a resource schema.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The generic attribute filter was misused.
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// The requested lifecycle operation is not supported by the resource.
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    /// A generic error for cases not covered by specific error types.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Errors that can occur when interacting with the Azure DevOps API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API request was unauthorized (401).
    #[error("Unauthorized: invalid or expired Personal Access Token")]
    Unauthorized,

    /// The requested resource was not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the resource that was not found.
        resource: String,
    },

    /// The API rate limit was exceeded (429).
    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimited {
        /// Number of seconds to wait before retrying.
        retry_after_seconds: u64,
    },

    /// The API returned an error response.
    #[error("{operation} failed with status {status}: {message}")]
    RequestFailed {
        /// The operation that was being performed.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Sanitized error message from the API.
        message: String,
    },

    /// Failed to parse the API response.
    #[error("Failed to parse response for {operation}: {message}")]
    ParseError {
        /// The operation that was being performed.
        operation: String,
        /// Description of the parse error.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A malformed URL was constructed for a request.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A listing response carried more than one continuation token.
    ///
    /// The API is contracted to return at most one token per page; anything
    /// else is a protocol violation and the pagination loop fails fast
    /// rather than guessing which token to follow.
    #[error("Expected at most 1 continuation token, but found {count}")]
    AmbiguousContinuation {
        /// Number of tokens the response declared.
        count: usize,
    },

    /// The API returned a well-formed but semantically unusable response.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Description of what made the response unusable.
        message: String,
    },
}

/// Errors that can occur during configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration field is missing.
    #[error("{field} is required (set it in the config file or the {env_var} env var)")]
    MissingRequired {
        /// Name of the missing field.
        field: String,
        /// Environment variable name for this field.
        env_var: String,
    },

    /// Failed to read the configuration file.
    #[error("Failed to read config file at {path}: {message}")]
    FileReadError {
        /// Path to the config file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config file at {path}: {message}")]
    ParseError {
        /// Path to the config file.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// An invalid value was provided for a configuration field.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Name of the field with invalid value.
        field: String,
        /// Description of why the value is invalid.
        message: String,
    },
}

/// Errors raised when an attribute bag does not satisfy a resource schema.
///
/// These fail fast, before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required attribute is absent.
    #[error("Failed to get '{name}' from state")]
    MissingAttribute {
        /// Name of the missing attribute.
        name: String,
    },

    /// An attribute is present but has the wrong type.
    #[error("Attribute '{name}' must be a {expected}")]
    TypeMismatch {
        /// Name of the offending attribute.
        name: String,
        /// Expected type description.
        expected: &'static str,
    },

    /// Two mutually exclusive attributes are both set.
    #[error("Attributes '{first}' and '{second}' conflict with each other")]
    ConflictingAttributes {
        /// First attribute of the conflicting pair.
        first: String,
        /// Second attribute of the conflicting pair.
        second: String,
    },

    /// An attribute is not declared by the resource schema.
    #[error("Attribute '{name}' is not declared by the schema")]
    UnknownAttribute {
        /// Name of the undeclared attribute.
        name: String,
    },

    /// An attribute value failed validation.
    #[error("Invalid value for '{name}': {message}")]
    InvalidValue {
        /// Name of the offending attribute.
        name: String,
        /// Description of why the value is invalid.
        message: String,
    },
}

/// Contract violations in the generic attribute filter.
///
/// The filter is string-only by contract; these indicate caller misuse
/// rather than a runtime condition, and there is no recovery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A comparison was attempted against a non-string field.
    #[error("Field '{name}' is not a string and cannot be compared")]
    NonStringField {
        /// Name of the offending field.
        name: String,
    },
}

/// Type alias for Results using ProviderError.
///
/// Note: This is not re-exported from the crate root to avoid shadowing `anyhow::Result`.
/// Use explicitly as `error::ProviderResult<T>` when needed.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
