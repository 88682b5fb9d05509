//! Continuation-token pagination over Azure DevOps list APIs.
//!
//! List endpoints return results in pages, handing back an opaque
//! continuation token while more results remain. The collectors here drain
//! such an API either completely ([`collect_all`]) or until a match is found
//! ([`find_first`]), calling a page-fetch function once per round trip.
//!
//! Pages are fetched strictly sequentially; a fetch error aborts the loop
//! immediately and no partial results are returned.

use std::future::Future;

use crate::error::ApiError;

/// One batch of results from a listing API call.
///
/// `continuation_tokens` holds every token the response declared. The API is
/// contracted to return at most one; an empty set marks the final page.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Records in this page.
    pub items: Vec<T>,
    /// Continuation tokens declared by the response.
    pub continuation_tokens: Vec<String>,
}

impl<T> Page<T> {
    /// Creates a final page with no continuation token.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            continuation_tokens: Vec::new(),
        }
    }

    /// Creates a page followed by more results.
    #[must_use]
    pub fn with_token(items: Vec<T>, token: impl Into<String>) -> Self {
        Self {
            items,
            continuation_tokens: vec![token.into()],
        }
    }

    /// Returns the token to continue with, or `None` on the final page.
    ///
    /// More than one declared token is a protocol violation and fails fast.
    pub fn next_token(&self) -> Result<Option<&str>, ApiError> {
        match self.continuation_tokens.len() {
            0 => Ok(None),
            1 => {
                let token = self.continuation_tokens[0].as_str();
                // Some endpoints send an empty header value on the last page.
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token))
                }
            }
            count => Err(ApiError::AmbiguousContinuation { count }),
        }
    }
}

/// Drains a paginated API into a complete result set.
///
/// `fetch` is called with the continuation token for each page, starting
/// with the empty string for the first page.
pub async fn collect_all<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    let mut items = Vec::new();
    let mut token = String::new();

    loop {
        let page = fetch(token.clone()).await?;
        let next = page.next_token()?.map(str::to_owned);
        tracing::trace!(
            received = page.items.len(),
            total = items.len() + page.items.len(),
            has_more = next.is_some(),
            "collected page"
        );
        items.extend(page.items);

        match next {
            Some(next) => token = next,
            None => break,
        }
    }

    Ok(items)
}

/// Walks a paginated API and returns the first record matching `target`.
///
/// Remaining pages are skipped as soon as a page yields a match. Returns
/// `None` when the API is exhausted without a match.
pub async fn find_first<T, F, Fut, P>(mut fetch: F, mut target: P) -> Result<Option<T>, ApiError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
    P: FnMut(&T) -> bool,
{
    let mut token = String::new();

    loop {
        let page = fetch(token.clone()).await?;
        let next = page.next_token()?.map(str::to_owned);

        if let Some(item) = page.items.into_iter().find(&mut target) {
            return Ok(Some(item));
        }

        match next {
            Some(next) => token = next,
            None => return Ok(None),
        }
    }
}
