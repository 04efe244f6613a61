//! Report table: fixed columns, newest merge first.

use serde::{Deserialize, Serialize};

use super::summary::ReportRow;

/// Column headers in output order.
pub const COLUMNS: [&str; 6] = [
    "PR_NUMBER",
    "PR_TITLE",
    "AUTHOR",
    "MERGE_DATE",
    "CR_PASSED",
    "CHECKS_PASSED",
];

/// One serialised report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Pull request number.
    #[serde(rename = "PR_NUMBER")]
    pub number: u64,
    /// Title.
    #[serde(rename = "PR_TITLE")]
    pub title: String,
    /// Author login; empty field when unknown.
    #[serde(rename = "AUTHOR")]
    pub author: Option<String>,
    /// RFC 3339 merge timestamp; empty field when unknown.
    #[serde(rename = "MERGE_DATE")]
    pub merge_date: Option<String>,
    /// At least one approving review.
    #[serde(rename = "CR_PASSED")]
    pub review_approved: bool,
    /// Combined status was `success`.
    #[serde(rename = "CHECKS_PASSED")]
    pub checks_passed: bool,
}

impl From<ReportRow> for ReportRecord {
    fn from(row: ReportRow) -> Self {
        Self {
            number: row.number,
            title: row.title,
            author: row.author,
            merge_date: row.merged_at.map(|merged_at| merged_at.to_rfc3339()),
            review_approved: row.review_approved,
            checks_passed: row.checks_passed,
        }
    }
}

/// Ordered report records ready to be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTable {
    records: Vec<ReportRecord>,
}

impl ReportTable {
    /// Records in output order.
    #[must_use]
    pub fn records(&self) -> &[ReportRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the table has no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Orders rows by merge instant, latest first, and formats them.
///
/// The sort is stable, so equal instants keep their input order. Rows
/// without a merge date go last.
#[must_use]
pub fn build_report(mut rows: Vec<ReportRow>) -> ReportTable {
    rows.sort_by(|left, right| right.merged_at.cmp(&left.merged_at));
    ReportTable {
        records: rows.into_iter().map(ReportRecord::from).collect(),
    }
}
