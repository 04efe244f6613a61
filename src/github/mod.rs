//! GitHub REST access for the fetch stage.
//!
//! A blocking [`HttpTransport`] issues authenticated requests, [`Pages`]
//! follows `Link: rel="next"` headers, and [`GitHubClient`] turns the pull
//! request, review, and combined status endpoints into typed records.
//! [`SnapshotFetcher`] strings these together and hands the result to the
//! snapshot writer.

pub mod client;
pub mod intake;
pub mod locator;
pub mod models;
pub mod pagination;
pub mod rate_limit;
pub mod transport;

pub use client::{DEFAULT_PAGE_SIZE, GitHubClient, MAX_PAGE_SIZE, PageSize};
pub use intake::{FetchSummary, SnapshotFetcher};
pub use locator::{
    DEFAULT_API_BASE, PersonalAccessToken, RepositoryLocator, RepositoryName, RepositoryOwner,
};
pub use models::{ApiUser, CombinedStatus, PullRequest, Review};
pub use pagination::{Pages, next_link};
pub use rate_limit::{DEFAULT_REQUEST_DELAY, RateLimitInfo, Throttle};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

#[cfg(test)]
pub use transport::MockHttpTransport;
