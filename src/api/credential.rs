//! PAT-based credential for Azure DevOps REST calls.
//!
//! Azure DevOps accepts a Personal Access Token as the password of a Basic
//! auth pair with an empty username. The PAT is stored as a `SecretString`
//! so it never appears in debug output or logs.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

/// PAT-based credential for Azure DevOps authentication.
///
/// # Example
///
/// ```rust,no_run
/// use azdo_provider::api::PatCredential;
/// use secrecy::SecretString;
///
/// let pat = SecretString::from("your-pat-token".to_string());
/// let credential = PatCredential::new(pat);
/// ```
#[derive(Clone)]
pub struct PatCredential {
    pat: SecretString,
}

impl PatCredential {
    /// Creates a new PAT credential from a SecretString.
    pub fn new(pat: SecretString) -> Self {
        Self { pat }
    }

    /// Creates a new PAT credential from a plain string.
    ///
    /// The string will be wrapped in a SecretString for secure handling.
    pub fn from_string(pat: String) -> Self {
        Self {
            pat: SecretString::from(pat),
        }
    }

    /// Attaches the credential to an outgoing request.
    ///
    /// Uses Basic auth with an empty username, which is how Azure DevOps
    /// expects PATs to be presented.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth("", Some(self.pat.expose_secret()))
    }
}

impl std::fmt::Debug for PatCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatCredential")
            .field("pat", &"[REDACTED]")
            .finish()
    }
}
