//! Error types shared by the fetch and report stages.

use thiserror::Error;

use crate::github::rate_limit::RateLimitInfo;

/// Errors surfaced while configuring, fetching, or reporting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditError {
    /// Arguments were rejected before any work started.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// No token was supplied on the command line or in the environment.
    #[error("personal access token is required (use --token or GITHUB_TOKEN)")]
    MissingToken,

    /// A URL could not be parsed or joined.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// A list page returned a non-success status.
    #[error("GET {url} returned {status}: {message}")]
    Transport {
        /// URL of the failing request.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body returned with the failure.
        message: String,
    },

    /// A list page was refused because the API quota is spent.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Rate limit info parsed from the response headers.
        rate_limit: Option<RateLimitInfo>,
        /// Error message from GitHub.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// A persisted pull request directory is incomplete or unreadable.
    #[error("malformed record in '{path}': {message}")]
    MalformedRecord {
        /// Directory holding the broken record.
        path: String,
        /// What was missing or unparsable.
        message: String,
    },

    /// The snapshot directory holds no pull request data.
    #[error("no pull request data found in '{input_dir}'")]
    NoPullRequestData {
        /// Directory that was scanned.
        input_dir: String,
    },

    /// Every row was removed by the merge date filter.
    #[error("no pull requests left after date filtering")]
    NoRowsAfterFilter,
}

impl AuditError {
    /// Returns true for the "nothing to report" outcomes that end a run
    /// cleanly rather than as a failure.
    #[must_use]
    pub const fn is_empty_result(&self) -> bool {
        matches!(self, Self::NoPullRequestData { .. } | Self::NoRowsAfterFilter)
    }
}

/// Converts an I/O error to an [`AuditError::Io`] with context.
pub(crate) fn io_error(context: &str, error: &std::io::Error) -> AuditError {
    AuditError::Io {
        message: format!("{context}: {error}"),
    }
}
