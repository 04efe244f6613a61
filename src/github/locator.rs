//! Repository identity wrappers and endpoint construction.

use url::Url;

use crate::error::AuditError;

/// Public GitHub REST API root.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Validates a repository owner.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Configuration`] when the value is blank or
    /// contains a path separator.
    pub fn new(value: &str) -> Result<Self, AuditError> {
        validate_segment("repository owner", value).map(Self)
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validates a repository name.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Configuration`] when the value is blank or
    /// contains a path separator.
    pub fn new(value: &str) -> Result<Self, AuditError> {
        validate_segment("repository name", value).map(Self)
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn validate_segment(label: &str, value: &str) -> Result<String, AuditError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuditError::Configuration {
            message: format!("{label} is required"),
        });
    }
    if trimmed.contains('/') {
        return Err(AuditError::Configuration {
            message: format!("{label} must not contain '/': {trimmed}"),
        });
    }
    Ok(trimmed.to_owned())
}

/// Personal access token wrapper enforcing presence.
///
/// The `Debug` output never includes the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, AuditError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AuditError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl std::fmt::Debug for PersonalAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PersonalAccessToken(<redacted>)")
    }
}

/// A repository on a GitHub API host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Builds a locator for `owner/repo` on the API rooted at `api_base`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidUrl`] when `api_base` is not an absolute
    /// http(s) URL, or [`AuditError::Configuration`] for a blank owner or
    /// repository.
    pub fn new(api_base: &str, owner: &str, repository: &str) -> Result<Self, AuditError> {
        let parsed =
            Url::parse(api_base).map_err(|error| AuditError::InvalidUrl(error.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AuditError::InvalidUrl(format!(
                "API base must use http or https: {api_base}"
            )));
        }

        Ok(Self {
            api_base: parsed,
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repository)?,
        })
    }

    /// Builds a locator against the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Configuration`] for a blank owner or repository.
    pub fn from_owner_repo(owner: &str, repository: &str) -> Result<Self, AuditError> {
        Self::new(DEFAULT_API_BASE, owner, repository)
    }

    /// API base URL.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    fn repo_url(&self) -> String {
        format!(
            "{base}/repos/{owner}/{repo}",
            base = self.api_base.as_str().trim_end_matches('/'),
            owner = self.owner.as_str(),
            repo = self.repository.as_str()
        )
    }

    /// Pull request list endpoint.
    #[must_use]
    pub fn pulls_url(&self) -> String {
        format!("{}/pulls", self.repo_url())
    }

    /// Review list endpoint for one pull request.
    #[must_use]
    pub fn reviews_url(&self, number: u64) -> String {
        format!("{}/pulls/{number}/reviews", self.repo_url())
    }

    /// Combined status endpoint for one commit.
    #[must_use]
    pub fn combined_status_url(&self, sha: &str) -> String {
        format!("{}/commits/{sha}/status", self.repo_url())
    }
}
