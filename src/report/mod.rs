//! Report stage: snapshot in, CSV (and optionally Parquet) out.
//!
//! Each `pr_<n>` directory becomes a [`ReportRow`] via [`summarize`]. Rows
//! pass through [`filter_by_date`], are ordered by [`build_report`], and are
//! written by [`write_report`]. The stage never contacts the API.

pub mod filter;
pub mod summary;
pub mod table;
pub mod writer;

pub use filter::{DateRange, filter_by_date};
pub use summary::{ReportRow, checks_passed, review_approved, row_from_snapshot, summarize};
pub use table::{COLUMNS, ReportRecord, ReportTable, build_report};
pub use writer::{
    ReportOutputs, columnar_path, read_report_csv, write_csv, write_parquet, write_report,
};

use crate::config::ReportConfig;
use crate::error::AuditError;
use crate::snapshot::discover_pull_request_dirs;

/// Outcome of a report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    /// Directories found under the snapshot root.
    pub discovered: usize,
    /// Directories skipped as malformed.
    pub skipped: usize,
    /// Rows written after filtering.
    pub written: usize,
    /// Files produced.
    pub outputs: ReportOutputs,
}

/// Runs the report stage described by `config`.
///
/// Malformed directories are logged and skipped.
///
/// # Errors
///
/// Returns [`AuditError::NoPullRequestData`] when no readable directory is
/// found, [`AuditError::NoRowsAfterFilter`] when the date window removes
/// every row, and [`AuditError::Io`] when the snapshot cannot be listed or
/// the report cannot be written. No report file is written in the first two
/// cases.
pub fn generate_report(config: &ReportConfig) -> Result<ReportSummary, AuditError> {
    let directories = discover_pull_request_dirs(&config.input_dir)?;
    let discovered = directories.len();

    let mut rows = Vec::with_capacity(discovered);
    for directory in &directories {
        match summarize(directory) {
            Ok(row) => rows.push(row),
            Err(error) => tracing::warn!(path = %directory, %error, "skipping pull request"),
        }
    }
    let skipped = discovered - rows.len();

    if rows.is_empty() {
        return Err(AuditError::NoPullRequestData {
            input_dir: config.input_dir.to_string(),
        });
    }

    let filtered = filter_by_date(rows, &config.date_range);
    tracing::info!(rows = filtered.len(), "processing pull requests after filtering");
    if filtered.is_empty() {
        return Err(AuditError::NoRowsAfterFilter);
    }

    let table = build_report(filtered);
    let outputs = write_report(&table, &config.output, config.columnar)?;

    Ok(ReportSummary {
        discovered,
        skipped,
        written: table.len(),
        outputs,
    })
}
