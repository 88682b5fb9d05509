//! Azure DevOps REST client.
//!
//! [`AzdoClient`] wraps a `reqwest::Client` with organization-scoped URL
//! building, PAT authentication, typed JSON decoding, and mapping of
//! non-success statuses onto [`ApiError`]. Listing endpoints surface their
//! continuation tokens from the `X-MS-ContinuationToken` response header
//! through [`Page`].

use reqwest::{RequestBuilder, StatusCode, header};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::credential::PatCredential;
use super::pagination::Page;
use crate::error::ApiError;

/// Default api-version for stable REST areas.
pub(crate) const API_VERSION: &str = "7.1";

/// Response header carrying the continuation token of list endpoints.
const CONTINUATION_TOKEN_HEADER: &str = "x-ms-continuationtoken";

/// Maximum length of response body to log (to avoid logging sensitive data).
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize a response body for logging and error messages.
///
/// Truncates long responses and strips non-printable characters.
fn sanitize_body(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < MAX_LOG_BODY_LENGTH)
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect()
}

/// Organization-scoped Azure DevOps REST client.
///
/// # Example
///
/// ```rust,no_run
/// use azdo_provider::api::AzdoClient;
/// use secrecy::SecretString;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AzdoClient::new(
///     "https://dev.azure.com/my-org",
///     SecretString::from("my-pat".to_string()),
/// )?;
/// assert_eq!(client.organization(), "my-org");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AzdoClient {
    organization: String,
    org_url: String,
    graph_url: String,
    http: reqwest::Client,
    credential: PatCredential,
}

impl AzdoClient {
    /// Creates a client from the organization service URL and a PAT.
    ///
    /// The graph (vssps) endpoint is derived from the service URL for hosted
    /// organizations; other hosts keep using the service URL for every area.
    pub fn new(org_service_url: &str, pat: SecretString) -> Result<Self, ApiError> {
        let parsed = Url::parse(org_service_url)?;
        let organization = parsed
            .path_segments()
            .and_then(|segments| segments.rev().find(|segment| !segment.is_empty()))
            .unwrap_or_default()
            .to_string();

        let org_url = org_service_url.trim_end_matches('/').to_string();
        let graph_url = match parsed.host_str() {
            Some("dev.azure.com") => org_url.replacen("dev.azure.com", "vssps.dev.azure.com", 1),
            _ => org_url.clone(),
        };

        Ok(Self::with_base_urls(organization, org_url, graph_url, pat))
    }

    /// Creates a client against explicit base URLs.
    ///
    /// Intended for tests running against a mock server.
    pub fn with_base_urls(
        organization: impl Into<String>,
        org_url: impl Into<String>,
        graph_url: impl Into<String>,
        pat: SecretString,
    ) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("azdo-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            organization: organization.into(),
            org_url: org_url.into().trim_end_matches('/').to_string(),
            graph_url: graph_url.into().trim_end_matches('/').to_string(),
            http,
            credential: PatCredential::new(pat),
        }
    }

    /// Returns the organization name.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Builds a URL under the organization service endpoint.
    ///
    /// Each segment is percent-encoded individually, so project names with
    /// spaces are safe to pass through.
    pub fn org_api_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiError> {
        build_url(&self.org_url, segments, query)
    }

    /// Builds a URL under the graph (vssps) endpoint.
    pub fn graph_api_url(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, ApiError> {
        build_url(&self.graph_url, segments, query)
    }

    /// Makes a GET request and decodes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        operation: &str,
    ) -> Result<T, ApiError> {
        let response = self.execute(self.http.get(url), operation).await?;
        response.decode(operation)
    }

    /// Makes a GET request against a listing endpoint.
    ///
    /// Decodes the `{count, value}` collection envelope and collects every
    /// continuation-token header value into the returned [`Page`].
    pub async fn get_paged<T: DeserializeOwned>(
        &self,
        url: Url,
        operation: &str,
    ) -> Result<Page<T>, ApiError> {
        let response = self.execute(self.http.get(url), operation).await?;
        let tokens = response.continuation_tokens.clone();
        let envelope: ListEnvelope<T> = response.decode(operation)?;
        Ok(Page {
            items: envelope.value,
            continuation_tokens: tokens,
        })
    }

    /// Makes a POST request with a JSON body and decodes the response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        operation: &str,
    ) -> Result<T, ApiError> {
        let response = self.execute(self.http.post(url).json(body), operation).await?;
        response.decode(operation)
    }

    /// Makes a PUT request with a JSON body and decodes the response.
    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        operation: &str,
    ) -> Result<T, ApiError> {
        let response = self.execute(self.http.put(url).json(body), operation).await?;
        response.decode(operation)
    }

    /// Makes a PATCH request carrying a JSON Patch document.
    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        operation: &str,
    ) -> Result<T, ApiError> {
        let request = self
            .http
            .patch(url)
            .json(body)
            .header(header::CONTENT_TYPE, "application/json-patch+json");
        let response = self.execute(request, operation).await?;
        response.decode(operation)
    }

    /// Makes a PATCH request with a plain JSON body and decodes the response.
    pub async fn patch_plain_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        operation: &str,
    ) -> Result<T, ApiError> {
        let response = self.execute(self.http.patch(url).json(body), operation).await?;
        response.decode(operation)
    }

    /// Makes a DELETE request, ignoring the response body.
    pub async fn delete(&self, url: Url, operation: &str) -> Result<(), ApiError> {
        self.execute(self.http.delete(url), operation).await?;
        Ok(())
    }

    /// Sends an authenticated request and maps the response status.
    async fn execute(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<RawResponse, ApiError> {
        tracing::debug!(operation, "sending request");

        let response = self.credential.apply(request).send().await?;
        let status = response.status();
        let continuation_tokens: Vec<String> = response
            .headers()
            .get_all(CONTINUATION_TOKEN_HEADER)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_owned)
            .collect();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        let body = response.text().await?;

        if status.is_success() {
            return Ok(RawResponse {
                continuation_tokens,
                body,
            });
        }

        tracing::error!(operation, status = %status, body = %sanitize_body(&body), "request failed");
        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound {
                resource: operation.to_string(),
            },
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited {
                retry_after_seconds: retry_after.unwrap_or(30),
            },
            _ => ApiError::RequestFailed {
                operation: operation.to_string(),
                status: status.as_u16(),
                message: sanitize_body(&body),
            },
        })
    }
}

impl std::fmt::Debug for AzdoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzdoClient")
            .field("organization", &self.organization)
            .field("org_url", &self.org_url)
            .field("graph_url", &self.graph_url)
            .finish_non_exhaustive()
    }
}

/// Successful response with its continuation tokens and raw body.
struct RawResponse {
    continuation_tokens: Vec<String>,
    body: String,
}

impl RawResponse {
    fn decode<T: DeserializeOwned>(&self, operation: &str) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|err| ApiError::ParseError {
            operation: operation.to_string(),
            message: err.to_string(),
        })
    }
}

/// Collection envelope wrapping every Azure DevOps list response.
#[derive(serde::Deserialize)]
struct ListEnvelope<T> {
    #[serde(default)]
    #[allow(dead_code)]
    count: Option<i64>,
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

fn build_url(base: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiError> {
    let mut path = String::from(base);
    for segment in segments {
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
    }

    if query.is_empty() {
        Ok(Url::parse(&path)?)
    } else {
        Ok(Url::parse_with_params(&path, query)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Organization Derivation
    ///
    /// Tests that the organization and graph URL derive from the service URL.
    ///
    /// ## Test Scenario
    /// - Creates clients from hosted and on-premises service URLs
    ///
    /// ## Expected Outcome
    /// - Hosted URLs derive a vssps graph endpoint
    /// - Other hosts keep the service URL for every area
    #[test]
    fn test_new_derives_organization_and_graph_url() {
        let client = AzdoClient::new(
            "https://dev.azure.com/my-org",
            SecretString::from("pat".to_string()),
        )
        .unwrap();
        assert_eq!(client.organization(), "my-org");
        assert!(client.graph_url.starts_with("https://vssps.dev.azure.com"));

        let client = AzdoClient::new(
            "https://tfs.example.com/my-collection",
            SecretString::from("pat".to_string()),
        )
        .unwrap();
        assert_eq!(client.organization(), "my-collection");
        assert_eq!(client.graph_url, "https://tfs.example.com/my-collection");
    }

    /// # URL Building
    ///
    /// Tests segment encoding and query parameters.
    ///
    /// ## Test Scenario
    /// - Builds a URL with a project name containing a space and a query pair
    ///
    /// ## Expected Outcome
    /// - The segment is percent-encoded and the query attached
    #[test]
    fn test_build_url_encodes_segments() {
        let url = build_url(
            "https://dev.azure.com/org",
            &["My Project", "_apis", "git", "repositories"],
            &[("api-version", "7.1")],
        )
        .unwrap();

        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/org/My%20Project/_apis/git/repositories?api-version=7.1"
        );
    }

    /// # Body Sanitization
    ///
    /// Tests truncation and character filtering of logged bodies.
    ///
    /// ## Test Scenario
    /// - Sanitizes a long body and one with control characters
    ///
    /// ## Expected Outcome
    /// - Long bodies are truncated with a marker, control characters removed
    #[test]
    fn test_sanitize_body() {
        let long = "x".repeat(500);
        let sanitized = sanitize_body(&long);
        assert!(sanitized.contains("truncated"));
        assert!(sanitized.len() < 300);

        assert_eq!(sanitize_body("ok\r\nbody"), "okbody");
    }
}
