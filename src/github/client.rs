//! Typed access to the three GitHub resources the audit needs.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AuditError;

use super::locator::RepositoryLocator;
use super::models::{CombinedStatus, PullRequest, Review};
use super::pagination::Pages;
use super::rate_limit::Throttle;
use super::transport::HttpTransport;

/// Largest page size GitHub accepts.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u8 = 50;

/// Number of records requested per list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(u8);

impl PageSize {
    /// Validates a page size against GitHub's `1..=100` range.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Configuration`] when `value` is out of range.
    pub fn new(value: u8) -> Result<Self, AuditError> {
        if value == 0 {
            return Err(AuditError::Configuration {
                message: "per_page must be at least 1".to_owned(),
            });
        }
        if value > MAX_PAGE_SIZE {
            return Err(AuditError::Configuration {
                message: format!("per_page must not exceed {MAX_PAGE_SIZE}"),
            });
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    fn query_value(self) -> (String, String) {
        ("per_page".to_owned(), self.0.to_string())
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

/// GitHub REST client over an [`HttpTransport`], paced by a [`Throttle`].
pub struct GitHubClient<T> {
    transport: T,
    throttle: Throttle,
}

impl<T> GitHubClient<T>
where
    T: HttpTransport,
{
    /// Creates a client from a transport and a throttle.
    #[must_use]
    pub const fn new(transport: T, throttle: Throttle) -> Self {
        Self {
            transport,
            throttle,
        }
    }

    /// Lists closed pull requests and keeps the merged ones.
    ///
    /// # Errors
    ///
    /// Returns the first page failure ([`AuditError::Transport`],
    /// [`AuditError::RateLimitExceeded`], [`AuditError::Network`]) or
    /// [`AuditError::Decode`] when a record lacks a pull request number.
    pub fn list_merged_pull_requests(
        &self,
        locator: &RepositoryLocator,
        page_size: PageSize,
    ) -> Result<Vec<PullRequest>, AuditError> {
        let query = vec![
            ("state".to_owned(), "closed".to_owned()),
            page_size.query_value(),
        ];
        let items = Pages::new(&self.transport, &self.throttle, locator.pulls_url(), query)
            .collect_items()?;
        let closed: Vec<PullRequest> = decode_records("pull request", items)?;
        let total = closed.len();
        let merged: Vec<PullRequest> = closed.into_iter().filter(PullRequest::is_merged).collect();

        tracing::info!(
            closed = total,
            merged = merged.len(),
            "listed closed pull requests"
        );
        Ok(merged)
    }

    /// Lists every review on one pull request.
    ///
    /// # Errors
    ///
    /// Returns the first page failure or a decode error.
    pub fn list_reviews(
        &self,
        locator: &RepositoryLocator,
        number: u64,
        page_size: PageSize,
    ) -> Result<Vec<Review>, AuditError> {
        let items = Pages::new(
            &self.transport,
            &self.throttle,
            locator.reviews_url(number),
            vec![page_size.query_value()],
        )
        .collect_items()?;
        decode_records("review", items)
    }

    /// Fetches the combined status of one commit.
    ///
    /// A non-success response becomes [`CombinedStatus::Degraded`] instead of
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Network`] when the request cannot complete at all.
    pub fn fetch_combined_status(
        &self,
        locator: &RepositoryLocator,
        sha: &str,
    ) -> Result<CombinedStatus, AuditError> {
        let url = locator.combined_status_url(sha);
        self.throttle.pause();
        let response = self.transport.get(&url, &[])?;

        if !response.is_success() {
            tracing::warn!(
                sha,
                status = response.status,
                "combined status unavailable; recording error payload"
            );
            return Ok(CombinedStatus::Degraded {
                error: format!("{}: {}", response.status, response.body),
            });
        }

        match serde_json::from_str::<Value>(&response.body) {
            Ok(Value::Object(payload)) => Ok(CombinedStatus::reported(payload)),
            Ok(other) => Ok(CombinedStatus::Degraded {
                error: format!("{}: unexpected body {other}", response.status),
            }),
            Err(error) => Ok(CombinedStatus::Degraded {
                error: format!("{}: undecodable body: {error}", response.status),
            }),
        }
    }
}

fn decode_records<R>(kind: &str, items: Vec<Value>) -> Result<Vec<R>, AuditError>
where
    R: DeserializeOwned,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|error| AuditError::Decode {
                message: format!("{kind} record {index}: {error}"),
            })
        })
        .collect()
}
