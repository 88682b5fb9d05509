//! ACL token construction.
//!
//! Security namespaces identify securable objects by `/`-joined token paths.
//! Leaving an optional trailing segment off widens the scope of the token to
//! every object of that type under the parent, which is a broader grant than
//! a fully qualified token.

use crate::utils::encode_utf16_hex;

/// Builds the ACL token for service endpoints.
///
/// - `endpoints/{project}` covers all service endpoints in the project
/// - `endpoints/{project}/{endpoint}` covers a single endpoint
#[must_use]
pub fn service_endpoint_token(project_id: &str, endpoint_id: Option<&str>) -> String {
    match endpoint_id {
        Some(endpoint_id) => format!("endpoints/{project_id}/{endpoint_id}"),
        None => format!("endpoints/{project_id}"),
    }
}

/// Builds the ACL token for git repositories.
///
/// - `repoV2/{project}` covers all repositories in the project
/// - `repoV2/{project}/{repository}` covers a single repository
/// - with a branch, the scope narrows to `refs/heads/...` where each branch
///   path segment is UTF-16 hex encoded
#[must_use]
pub fn repository_token(
    project_id: &str,
    repository_id: Option<&str>,
    branch_name: Option<&str>,
) -> String {
    let mut token = format!("repoV2/{project_id}");

    if let Some(repository_id) = repository_id {
        token.push('/');
        token.push_str(repository_id);

        if let Some(branch_name) = branch_name {
            token.push_str("/refs/heads");
            for segment in branch_name.split('/').filter(|segment| !segment.is_empty()) {
                token.push('/');
                token.push_str(&encode_utf16_hex(segment));
            }
        }
    }

    token
}

#[cfg(test)]
mod tests {
    use super::*;

    /// # Service Endpoint Tokens
    ///
    /// Tests both scopes of the endpoints namespace token.
    ///
    /// ## Test Scenario
    /// - Builds tokens with and without an endpoint id
    ///
    /// ## Expected Outcome
    /// - "endpoints/P" without an id, "endpoints/P/E" with one
    #[test]
    fn test_service_endpoint_token() {
        assert_eq!(service_endpoint_token("P", None), "endpoints/P");
        assert_eq!(service_endpoint_token("P", Some("E")), "endpoints/P/E");
    }

    /// # Repository Tokens
    ///
    /// Tests widening and narrowing of the repoV2 token.
    ///
    /// ## Test Scenario
    /// - Builds project-wide, repository, and branch-scoped tokens
    ///
    /// ## Expected Outcome
    /// - Each optional segment narrows the scope
    /// - Branch segments are UTF-16 hex encoded individually
    #[test]
    fn test_repository_token() {
        assert_eq!(repository_token("P", None, None), "repoV2/P");
        assert_eq!(repository_token("P", Some("R"), None), "repoV2/P/R");

        // "master" -> 6d0061007300740065007200
        assert_eq!(
            repository_token("P", Some("R"), Some("master")),
            "repoV2/P/R/refs/heads/6d0061007300740065007200"
        );

        // Branch path segments are encoded one by one.
        let token = repository_token("P", Some("R"), Some("feature/x"));
        assert_eq!(
            token,
            format!(
                "repoV2/P/R/refs/heads/{}/{}",
                crate::utils::encode_utf16_hex("feature"),
                crate::utils::encode_utf16_hex("x")
            )
        );

        // A branch without a repository does not narrow the token.
        assert_eq!(repository_token("P", None, Some("master")), "repoV2/P");
    }
}
