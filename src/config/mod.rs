//! Command-line configuration for the `fetch` and `report` stages.
//!
//! Arguments are parsed with clap and then validated into [`FetchConfig`] or
//! [`ReportConfig`]; components only ever see the validated form.
//!
//! # Environment Variables
//!
//! - `GITHUB_TOKEN`: personal access token used when `--token` is absent
//! - `RUST_LOG`: log filter for the binary (default `info`)
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use merge_audit::config::{Cli, Command};
//!
//! let cli = Cli::parse_from(["merge-audit", "report", "--since", "2024-01-01"]);
//! if let Command::Report(args) = cli.command {
//!     let config = args.into_config().expect("valid report arguments");
//!     assert!(!config.columnar);
//! }
//! ```

use std::env;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::error::AuditError;
use crate::github::client::{DEFAULT_PAGE_SIZE, PageSize};
use crate::github::locator::{DEFAULT_API_BASE, PersonalAccessToken, RepositoryLocator};
use crate::report::filter::DateRange;
use crate::report::writer::columnar_path;

/// Snapshot directory used when `--out`/`--in` is not given.
pub const DEFAULT_SNAPSHOT_DIR: &str = "outputs/raw";

/// Report destination used when `report --out` is not given.
pub const DEFAULT_REPORT_PATH: &str = "outputs/processed/report.csv";

/// Environment variable consulted for the token.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Top-level command line.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "merge-audit",
    version,
    about = "Audit merged pull requests for approving reviews and passing checks"
)]
pub struct Cli {
    /// Stage to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The two pipeline stages.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Download merged pull requests, reviews, and statuses to disk.
    Fetch(FetchArgs),
    /// Build the audit report from a downloaded snapshot.
    Report(ReportArgs),
}

/// Arguments of `merge-audit fetch`.
#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Repository owner (user or organisation).
    #[arg(long)]
    pub owner: String,

    /// Repository name.
    #[arg(long)]
    pub repo: String,

    /// Snapshot directory to write.
    #[arg(long, default_value = DEFAULT_SNAPSHOT_DIR)]
    pub out: Utf8PathBuf,

    /// Records requested per page (1-100).
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub per_page: u8,

    /// Personal access token; falls back to `GITHUB_TOKEN`.
    #[arg(long)]
    pub token: Option<String>,

    /// REST API root, for GitHub Enterprise.
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,
}

/// Validated settings for the fetch stage.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Repository and API root.
    pub locator: RepositoryLocator,
    /// Snapshot directory to write.
    pub snapshot_dir: Utf8PathBuf,
    /// Records requested per page.
    pub page_size: PageSize,
    /// Token sent with every request.
    pub token: PersonalAccessToken,
}

impl FetchArgs {
    /// Validates the arguments and resolves the token.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::MissingToken`] when neither `--token` nor
    /// `GITHUB_TOKEN` provides a token, [`AuditError::Configuration`] for an
    /// invalid owner, repository, or page size, and
    /// [`AuditError::InvalidUrl`] for an unusable API root.
    pub fn into_config(self) -> Result<FetchConfig, AuditError> {
        let token = resolve_token(self.token.as_deref())?;
        let page_size = PageSize::new(self.per_page)?;
        let locator = RepositoryLocator::new(&self.api_base, &self.owner, &self.repo)?;
        Ok(FetchConfig {
            locator,
            snapshot_dir: self.out,
            page_size,
            token,
        })
    }
}

/// Arguments of `merge-audit report`.
#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Snapshot directory to read.
    #[arg(long = "in", default_value = DEFAULT_SNAPSHOT_DIR)]
    pub input: Utf8PathBuf,

    /// CSV file to write.
    #[arg(long = "out", default_value = DEFAULT_REPORT_PATH)]
    pub output: Utf8PathBuf,

    /// Also write a Parquet copy next to the CSV file.
    #[arg(long)]
    pub parquet: bool,

    /// Keep pull requests merged on or after this date (YYYY-MM-DD).
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Keep pull requests merged on or before this date (YYYY-MM-DD).
    #[arg(long)]
    pub until: Option<NaiveDate>,
}

/// Validated settings for the report stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Snapshot directory to read.
    pub input_dir: Utf8PathBuf,
    /// CSV file to write.
    pub output: Utf8PathBuf,
    /// Whether to write the Parquet copy.
    pub columnar: bool,
    /// Merge date window.
    pub date_range: DateRange,
}

impl ReportArgs {
    /// Validates the arguments.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Configuration`] when `--since` is after
    /// `--until`, or when `--parquet` is set and `--out` already names the
    /// Parquet file.
    pub fn into_config(self) -> Result<ReportConfig, AuditError> {
        if self.parquet && columnar_path(&self.output) == self.output {
            return Err(AuditError::Configuration {
                message: format!(
                    "--out '{}' would be overwritten by the Parquet copy; use a .csv path",
                    self.output
                ),
            });
        }
        Ok(ReportConfig {
            date_range: DateRange::new(self.since, self.until)?,
            input_dir: self.input,
            output: self.output,
            columnar: self.parquet,
        })
    }
}

/// Picks the explicit token, else `GITHUB_TOKEN`.
///
/// Blank values count as absent.
///
/// # Errors
///
/// Returns [`AuditError::MissingToken`] when no non-blank token is found.
pub fn resolve_token(explicit: Option<&str>) -> Result<PersonalAccessToken, AuditError> {
    if let Some(token) = explicit.filter(|value| !value.trim().is_empty()) {
        return PersonalAccessToken::new(token);
    }
    let from_env = env::var(TOKEN_ENV_VAR).map_err(|_| AuditError::MissingToken)?;
    PersonalAccessToken::new(from_env)
}

#[cfg(test)]
mod tests;
