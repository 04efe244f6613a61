//! Blocking HTTP transport for the GitHub REST API.
//!
//! The [`HttpTransport`] trait is the seam between request logic and the
//! network: pagination and the fetch client only see [`HttpResponse`]
//! values, so tests can substitute a mock transport.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, LINK, USER_AGENT};

use crate::error::AuditError;

use super::locator::PersonalAccessToken;
use super::rate_limit::RateLimitInfo;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = "merge-audit";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Successful or unsuccessful HTTP exchange reduced to what the fetcher uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Link` header, if any.
    pub link: Option<String>,
    /// Rate limit headers, when all three were present.
    pub rate_limit: Option<RateLimitInfo>,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response with the given status and body and no headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            link: None,
            rate_limit: None,
            body: body.into(),
        }
    }

    /// Attaches a raw `Link` header value.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Attaches rate limit information.
    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit: RateLimitInfo) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Issues authenticated GET requests.
#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport {
    /// Sends a GET to `url` with `query` appended.
    ///
    /// A non-success status is not an error at this level; only failures to
    /// complete the exchange are.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Network`] when the request cannot be sent or
    /// its body cannot be read.
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, AuditError>;
}

/// `reqwest`-backed transport sending a bearer token with every request.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    token: PersonalAccessToken,
}

impl ReqwestTransport {
    /// Builds a transport with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Configuration`] when the HTTP client cannot be
    /// constructed.
    pub fn new(token: PersonalAccessToken) -> Result<Self, AuditError> {
        Self::with_timeout(token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Builds a transport with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Configuration`] when the HTTP client cannot be
    /// constructed.
    pub fn with_timeout(token: PersonalAccessToken, timeout: Duration) -> Result<Self, AuditError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AuditError::Configuration {
                message: format!("failed to configure GitHub HTTP client: {error}"),
            })?;
        Ok(Self { client, token })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse, AuditError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(self.token.value())
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .map_err(|error| AuditError::Network {
                message: format!("GET {url} failed: {error}"),
            })?;

        let status = response.status().as_u16();
        let headers = response.headers();
        let link = header_to_string(headers, LINK.as_str());
        let rate_limit = rate_limit_from_headers(headers);
        let body = response.text().map_err(|error| AuditError::Network {
            message: format!("reading body of {url} failed: {error}"),
        })?;

        Ok(HttpResponse {
            status,
            link,
            rate_limit,
            body,
        })
    }
}

fn header_to_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

fn rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let value = |name: &str| headers.get(name).and_then(|raw| raw.to_str().ok());
    RateLimitInfo::from_header_values(
        value("x-ratelimit-limit"),
        value("x-ratelimit-remaining"),
        value("x-ratelimit-reset"),
    )
}
