//! Merge audit library: evidence that merged pull requests were reviewed and
//! passed their checks.
//!
//! The `fetch` stage walks the GitHub REST API (following `Link` pagination)
//! and writes a snapshot of merged pull requests, their reviews, and the
//! combined status of each merge commit. The `report` stage reads that
//! snapshot back and writes a CSV report, optionally with a Parquet copy.

pub mod config;
pub mod error;
pub mod github;
pub mod report;
pub mod snapshot;

pub use config::{FetchConfig, ReportConfig};
pub use error::AuditError;
pub use github::{
    CombinedStatus, GitHubClient, PageSize, PersonalAccessToken, RepositoryLocator,
    ReqwestTransport, SnapshotFetcher, Throttle,
};
pub use report::{ReportSummary, generate_report};
pub use snapshot::PullRequestSnapshot;
