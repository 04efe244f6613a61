//! Fetch stage facade used by the CLI.

use camino::Utf8Path;

use crate::error::AuditError;
use crate::snapshot::{PullRequestSnapshot, persist_snapshot};

use super::client::{GitHubClient, PageSize};
use super::locator::RepositoryLocator;
use super::models::CombinedStatus;
use super::transport::HttpTransport;

/// Counts reported once a snapshot has been written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Merged pull requests persisted.
    pub pull_requests: usize,
    /// Pull requests whose combined status could not be retrieved.
    pub degraded_statuses: usize,
    /// Pull requests without a merge commit.
    pub missing_statuses: usize,
}

/// Collects merged pull requests with their reviews and statuses.
pub struct SnapshotFetcher<'client, T>
where
    T: HttpTransport,
{
    client: &'client GitHubClient<T>,
    page_size: PageSize,
}

impl<'client, T> SnapshotFetcher<'client, T>
where
    T: HttpTransport,
{
    /// Creates a fetcher over `client` requesting `page_size` records per page.
    #[must_use]
    pub const fn new(client: &'client GitHubClient<T>, page_size: PageSize) -> Self {
        Self { client, page_size }
    }

    /// Fetches every merged pull request of the repository in memory.
    ///
    /// Pull requests without a merge commit get [`CombinedStatus::Missing`]
    /// and no status request is sent for them.
    ///
    /// # Errors
    ///
    /// Returns the first listing failure. Status failures are recorded as
    /// [`CombinedStatus::Degraded`] unless the request could not be sent.
    pub fn fetch(
        &self,
        locator: &RepositoryLocator,
    ) -> Result<Vec<PullRequestSnapshot>, AuditError> {
        let pulls = self
            .client
            .list_merged_pull_requests(locator, self.page_size)?;
        let total = pulls.len();
        let mut snapshots = Vec::with_capacity(total);

        for (index, pull_request) in pulls.into_iter().enumerate() {
            let reviews = self
                .client
                .list_reviews(locator, pull_request.number, self.page_size)?;
            let status = match pull_request.merge_commit() {
                Some(sha) => self.client.fetch_combined_status(locator, sha)?,
                None => CombinedStatus::Missing,
            };
            tracing::info!(
                number = pull_request.number,
                reviews = reviews.len(),
                "processed {}/{total}",
                index + 1
            );
            snapshots.push(PullRequestSnapshot {
                pull_request,
                reviews,
                status,
            });
        }

        Ok(snapshots)
    }

    /// Fetches everything, then writes the snapshot under `root`.
    ///
    /// Nothing is written when any fetch step fails.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::fetch`] or from
    /// [`persist_snapshot`].
    pub fn fetch_into(
        &self,
        locator: &RepositoryLocator,
        root: &Utf8Path,
    ) -> Result<FetchSummary, AuditError> {
        let snapshots = self.fetch(locator)?;
        persist_snapshot(root, &snapshots)?;

        let summary = summarise(&snapshots);
        tracing::info!(
            api_base = %locator.api_base(),
            owner = locator.owner().as_str(),
            repository = locator.repository().as_str(),
            pull_requests = summary.pull_requests,
            degraded = summary.degraded_statuses,
            missing = summary.missing_statuses,
            "fetch complete"
        );
        Ok(summary)
    }
}

fn summarise(snapshots: &[PullRequestSnapshot]) -> FetchSummary {
    snapshots
        .iter()
        .fold(FetchSummary::default(), |mut summary, snapshot| {
            summary.pull_requests += 1;
            match snapshot.status {
                CombinedStatus::Degraded { .. } => summary.degraded_statuses += 1,
                CombinedStatus::Missing => summary.missing_statuses += 1,
                CombinedStatus::Reported { .. } => {}
            }
            summary
        })
}
