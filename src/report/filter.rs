//! Inclusive merge date window.

use chrono::{NaiveDate, Utc};

use crate::error::AuditError;

use super::summary::ReportRow;

/// Optional calendar bounds on the merge date, both inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
}

impl DateRange {
    /// Builds a range, rejecting `since` after `until`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Configuration`] when both bounds are given and
    /// `since` is later than `until`.
    pub fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Result<Self, AuditError> {
        if let (Some(start), Some(end)) = (since, until)
            && start > end
        {
            return Err(AuditError::Configuration {
                message: format!("--since {start} is after --until {end}"),
            });
        }
        Ok(Self { since, until })
    }

    /// Lower bound.
    #[must_use]
    pub const fn since(&self) -> Option<NaiveDate> {
        self.since
    }

    /// Upper bound.
    #[must_use]
    pub const fn until(&self) -> Option<NaiveDate> {
        self.until
    }

    /// True when neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }

    /// Tests one row. Rows without a merge date never match a bounded range.
    #[must_use]
    pub fn contains(&self, row: &ReportRow) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(merged_at) = row.merged_at else {
            return false;
        };
        let day = merged_at.with_timezone(&Utc).date_naive();
        self.since.is_none_or(|since| day >= since) && self.until.is_none_or(|until| day <= until)
    }
}

/// Keeps the rows whose merge date falls inside `range`.
///
/// With no bounds the rows come back unchanged, including undated ones.
#[must_use]
pub fn filter_by_date(rows: Vec<ReportRow>, range: &DateRange) -> Vec<ReportRow> {
    if range.is_unbounded() {
        return rows;
    }
    rows.into_iter().filter(|row| range.contains(row)).collect()
}
