//! Per pull request audit signals.

use camino::Utf8Path;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::AuditError;
use crate::github::models::{CombinedStatus, Review};
use crate::snapshot::{PullRequestSnapshot, read_snapshot};

const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One pull request reduced to the fields the report shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Pull request number.
    pub number: u64,
    /// Title; empty when the record has none.
    pub title: String,
    /// Author login.
    pub author: Option<String>,
    /// Merge timestamp with the offset it was recorded in.
    pub merged_at: Option<DateTime<FixedOffset>>,
    /// At least one review approved the change.
    pub review_approved: bool,
    /// The merge commit's combined status was `success`.
    pub checks_passed: bool,
}

/// Reads one `pr_<n>` directory and derives its report row.
///
/// # Errors
///
/// Returns [`AuditError::MalformedRecord`] when a record file is missing or
/// unparsable, or when `merged_at` is not a date or timestamp.
pub fn summarize(pr_directory: &Utf8Path) -> Result<ReportRow, AuditError> {
    let snapshot = read_snapshot(pr_directory)?;
    row_from_snapshot(pr_directory, &snapshot)
}

/// Derives a report row from records already in memory.
///
/// `source` only labels errors.
///
/// # Errors
///
/// Returns [`AuditError::MalformedRecord`] when `merged_at` cannot be parsed.
pub fn row_from_snapshot(
    source: &Utf8Path,
    snapshot: &PullRequestSnapshot,
) -> Result<ReportRow, AuditError> {
    let pull = &snapshot.pull_request;
    let merged_at = parse_merge_date(pull.merged_at.as_deref()).map_err(|error| {
        AuditError::MalformedRecord {
            path: source.to_string(),
            message: format!("invalid merged_at: {error}"),
        }
    })?;

    Ok(ReportRow {
        number: pull.number,
        title: pull.title.clone().unwrap_or_default(),
        author: pull.author().map(ToOwned::to_owned),
        merged_at,
        review_approved: review_approved(&snapshot.reviews),
        checks_passed: checks_passed(&snapshot.status),
    })
}

/// True when any review's state is `APPROVED`, ignoring case.
#[must_use]
pub fn review_approved(reviews: &[Review]) -> bool {
    reviews.iter().any(Review::is_approval)
}

/// True only when the combined state is exactly `success`.
#[must_use]
pub fn checks_passed(status: &CombinedStatus) -> bool {
    status.is_success()
}

/// Parses `merged_at`, reading timestamps without an offset as UTC.
fn parse_merge_date(
    value: Option<&str>,
) -> Result<Option<DateTime<FixedOffset>>, chrono::ParseError> {
    let Some(text) = value.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };
    let rfc3339_error = match DateTime::parse_from_rfc3339(text) {
        Ok(merged_at) => return Ok(Some(merged_at)),
        Err(error) => error,
    };
    let naive = NaiveDateTime::parse_from_str(text, NAIVE_TIMESTAMP_FORMAT).or_else(|_| {
        NaiveDate::parse_from_str(text, DATE_FORMAT).map(|day| day.and_time(NaiveTime::MIN))
    });
    naive
        .map(|merged_at| Some(merged_at.and_utc().fixed_offset()))
        .map_err(|_| rfc3339_error)
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn reviews(states: &[&str]) -> Vec<Review> {
        states
            .iter()
            .map(|state| {
                serde_json::from_value(json!({ "state": state })).expect("review should decode")
            })
            .collect()
    }

    #[rstest]
    #[case::none(&[], false)]
    #[case::commented_then_approved(&["COMMENTED", "APPROVED"], true)]
    #[case::lowercase(&["approved"], true)]
    #[case::changes_requested(&["CHANGES_REQUESTED"], false)]
    fn approval_needs_one_approving_review(#[case] states: &[&str], #[case] expected: bool) {
        assert_eq!(review_approved(&reviews(states)), expected);
    }

    #[rstest]
    #[case::success(json!({ "state": "success" }), true)]
    #[case::failure(json!({ "state": "failure" }), false)]
    #[case::pending(json!({ "state": "pending" }), false)]
    #[case::missing(json!({}), false)]
    #[case::degraded(json!({ "error": "404: Not Found" }), false)]
    fn checks_need_exact_success(#[case] payload: serde_json::Value, #[case] expected: bool) {
        let status: CombinedStatus =
            serde_json::from_value(payload).expect("status should decode");
        assert_eq!(checks_passed(&status), expected);
    }

    fn snapshot(pull: serde_json::Value) -> PullRequestSnapshot {
        PullRequestSnapshot {
            pull_request: serde_json::from_value(pull).expect("pull request should decode"),
            reviews: reviews(&["APPROVED"]),
            status: CombinedStatus::Missing,
        }
    }

    #[rstest]
    fn absent_fields_become_empty() {
        let row = row_from_snapshot(
            Utf8Path::new("pr_9"),
            &snapshot(json!({ "number": 9, "user": null })),
        )
        .expect("row should build");

        assert_eq!(row.title, "");
        assert_eq!(row.author, None);
        assert_eq!(row.merged_at, None);
        assert!(row.review_approved);
        assert!(!row.checks_passed);
    }

    #[rstest]
    fn keeps_merge_offset() {
        let row = row_from_snapshot(
            Utf8Path::new("pr_1"),
            &snapshot(json!({
                "number": 1,
                "title": "Fix",
                "user": { "login": "dev" },
                "merged_at": "2024-01-15T12:00:00+02:00"
            })),
        )
        .expect("row should build");

        let merged_at = row.merged_at.expect("merge date should parse");
        assert_eq!(merged_at.to_rfc3339(), "2024-01-15T12:00:00+02:00");
        assert_eq!(row.author.as_deref(), Some("dev"));
    }

    #[rstest]
    #[case::naive_timestamp("2024-01-15T10:00:00", "2024-01-15T10:00:00+00:00")]
    #[case::fractional_seconds("2024-01-15T10:00:00.250", "2024-01-15T10:00:00.250+00:00")]
    #[case::date_only("2024-01-15", "2024-01-15T00:00:00+00:00")]
    fn offsetless_merge_date_reads_as_utc(#[case] merged_at: &str, #[case] expected: &str) {
        let row = row_from_snapshot(
            Utf8Path::new("pr_3"),
            &snapshot(json!({ "number": 3, "merged_at": merged_at })),
        )
        .expect("row should build");

        let parsed = row.merged_at.expect("merge date should parse");
        assert_eq!(parsed.to_rfc3339(), expected);
    }

    #[rstest]
    fn unparsable_merge_date_is_malformed() {
        let result = row_from_snapshot(
            Utf8Path::new("pr_2"),
            &snapshot(json!({ "number": 2, "merged_at": "yesterday" })),
        );

        assert!(
            matches!(result, Err(AuditError::MalformedRecord { ref path, .. }) if path == "pr_2"),
            "expected MalformedRecord, got {result:?}"
        );
    }
}
