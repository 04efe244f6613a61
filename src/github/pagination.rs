//! Cursor-style pagination over GitHub list resources.
//!
//! GitHub advertises the next page of a list in the `Link` response header:
//!
//! ```text
//! <https://api.github.com/repositories/1/pulls?page=2>; rel="next", <...>; rel="last"
//! ```
//!
//! [`Pages`] walks that chain lazily, one request per call to `next`. Query
//! parameters are sent with the first request only; later URLs come from the
//! server fully qualified. The walk stops when a response carries no
//! `rel="next"` entry, or after the first failure.

use serde_json::Value;

use crate::error::AuditError;

use super::rate_limit::Throttle;
use super::transport::{HttpResponse, HttpTransport};

/// Extracts the `rel="next"` target from a `Link` header value.
///
/// # Example
///
/// ```
/// use merge_audit::github::pagination::next_link;
///
/// let header = r#"<https://api.example.com/items?page=3>; rel="next", <https://api.example.com/items?page=9>; rel="last""#;
/// assert_eq!(
///     next_link(header).as_deref(),
///     Some("https://api.example.com/items?page=3")
/// );
/// assert_eq!(next_link(r#"<https://api.example.com/items?page=1>; rel="prev""#), None);
/// ```
#[must_use]
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let url = target.strip_prefix('<')?.strip_suffix('>')?;
        parts
            .any(|param| is_next_relation(param))
            .then(|| url.to_owned())
    })
}

fn is_next_relation(param: &str) -> bool {
    let Some((key, value)) = param.split_once('=') else {
        return false;
    };
    if !key.trim().eq_ignore_ascii_case("rel") {
        return false;
    }
    value
        .trim()
        .trim_matches('"')
        .split_whitespace()
        .any(|relation| relation.eq_ignore_ascii_case("next"))
}

/// Lazy iterator over the pages of one list resource.
///
/// Each item is the ordered list of records on one page. A response body
/// that is a single object counts as a page holding that one record.
pub struct Pages<'a, T: ?Sized> {
    transport: &'a T,
    throttle: &'a Throttle,
    next_url: Option<String>,
    query: Vec<(String, String)>,
}

impl<'a, T> Pages<'a, T>
where
    T: HttpTransport + ?Sized,
{
    /// Starts a walk at `url`, sending `query` with the first request only.
    #[must_use]
    pub fn new(
        transport: &'a T,
        throttle: &'a Throttle,
        url: impl Into<String>,
        query: Vec<(String, String)>,
    ) -> Self {
        Self {
            transport,
            throttle,
            next_url: Some(url.into()),
            query,
        }
    }

    /// Drains every page and concatenates the records in page order.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by any page.
    pub fn collect_items(self) -> Result<Vec<Value>, AuditError> {
        let mut items = Vec::new();
        for page in self {
            items.extend(page?);
        }
        Ok(items)
    }

    fn fetch_page(&mut self, url: &str) -> Result<Vec<Value>, AuditError> {
        let query = std::mem::take(&mut self.query);
        self.throttle.pause();
        let response = self.transport.get(url, &query)?;

        if let Some(rate_limit) = response.rate_limit {
            tracing::debug!(
                url,
                remaining = rate_limit.remaining(),
                limit = rate_limit.limit(),
                "GitHub rate limit"
            );
        }

        if !response.is_success() {
            return Err(page_failure(url, response));
        }

        self.next_url = response.link.as_deref().and_then(next_link);
        page_items(url, &response.body)
    }
}

impl<T> Iterator for Pages<'_, T>
where
    T: HttpTransport + ?Sized,
{
    type Item = Result<Vec<Value>, AuditError>;

    fn next(&mut self) -> Option<Self::Item> {
        let url = self.next_url.take()?;
        Some(self.fetch_page(&url))
    }
}

fn page_items(url: &str, body: &str) -> Result<Vec<Value>, AuditError> {
    let parsed: Value = serde_json::from_str(body).map_err(|error| AuditError::Decode {
        message: format!("{url}: {error}"),
    })?;
    match parsed {
        Value::Array(items) => Ok(items),
        object @ Value::Object(_) => Ok(vec![object]),
        other => Err(AuditError::Decode {
            message: format!("{url}: expected an object or array, got {other}"),
        }),
    }
}

/// Maps a non-success list response to a fatal error.
pub(crate) fn page_failure(url: &str, response: HttpResponse) -> AuditError {
    let rate_limited = matches!(response.status, 403 | 429)
        && response
            .rate_limit
            .is_some_and(|rate_limit| rate_limit.is_exhausted());

    if rate_limited {
        let message = match response.rate_limit {
            Some(info) => format!(
                "GET {url} returned {status} (resets at {reset}, in {wait}s)",
                status = response.status,
                reset = info.reset_at(),
                wait = info.seconds_until_reset()
            ),
            None => format!("GET {url} returned {}", response.status),
        };
        return AuditError::RateLimitExceeded {
            rate_limit: response.rate_limit,
            message,
        };
    }

    AuditError::Transport {
        url: url.to_owned(),
        status: response.status,
        message: response.body,
    }
}
