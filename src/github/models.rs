//! Pull request, review, and combined status records.
//!
//! Records keep every field GitHub returned: the fields the audit reads are
//! typed, the rest ride along in `extra` so a persisted record is the API
//! payload verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account reference embedded in pull requests and reviews.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUser {
    /// Login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    /// Remaining user fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A pull request as returned by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number, unique within the repository.
    pub number: u64,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Author account.
    #[serde(default)]
    pub user: Option<ApiUser>,
    /// Merge timestamp (ISO 8601); absent or null when not merged.
    #[serde(default)]
    pub merged_at: Option<String>,
    /// Commit created by the merge, used to look up status checks.
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    /// Remaining API fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PullRequest {
    /// Author login, when the record names one.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.login.as_deref())
    }

    /// True when the pull request carries a non-empty merge timestamp.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.merged_at
            .as_deref()
            .is_some_and(|merged_at| !merged_at.trim().is_empty())
    }

    /// Merge commit sha, ignoring blank values.
    #[must_use]
    pub fn merge_commit(&self) -> Option<&str> {
        self.merge_commit_sha
            .as_deref()
            .filter(|sha| !sha.trim().is_empty())
    }
}

/// A review left on a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Reviewer account.
    #[serde(default)]
    pub user: Option<ApiUser>,
    /// Verdict token such as `APPROVED` or `CHANGES_REQUESTED`.
    #[serde(default)]
    pub state: Option<String>,
    /// Remaining API fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Review {
    /// Reviewer login, when present.
    #[must_use]
    pub fn reviewer(&self) -> Option<&str> {
        self.user.as_ref().and_then(|user| user.login.as_deref())
    }

    /// True when the verdict is an approval, ignoring case.
    #[must_use]
    pub fn is_approval(&self) -> bool {
        self.state
            .as_deref()
            .is_some_and(|state| state.to_uppercase() == "APPROVED")
    }
}

/// Aggregate check state for a pull request's merge commit.
///
/// Persisted as a single JSON object: `{}` for [`CombinedStatus::Missing`],
/// `{"error": "..."}` for [`CombinedStatus::Degraded`], and the API payload
/// for [`CombinedStatus::Reported`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StatusDocument", into = "StatusDocument")]
pub enum CombinedStatus {
    /// The pull request has no merge commit, so nothing was fetched.
    #[default]
    Missing,
    /// The status endpoint answered.
    Reported {
        /// Aggregate state token (`success`, `failure`, `pending`).
        state: Option<String>,
        /// Remaining API fields.
        extra: Map<String, Value>,
    },
    /// The status endpoint returned a non-success response.
    Degraded {
        /// `"<status>: <body>"` of the failed response.
        error: String,
    },
}

impl CombinedStatus {
    /// Builds a reported status from an API payload.
    #[must_use]
    pub fn reported(payload: Map<String, Value>) -> Self {
        Self::from(StatusDocument::from_map(payload))
    }

    /// The aggregate state token, when the API reported one.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::Reported { state, .. } => state.as_deref(),
            Self::Missing | Self::Degraded { .. } => None,
        }
    }

    /// True only for an exact `success` state.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state() == Some("success")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StatusDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl StatusDocument {
    fn from_map(mut payload: Map<String, Value>) -> Self {
        let state = payload
            .remove("state")
            .and_then(|value| value.as_str().map(ToOwned::to_owned));
        Self {
            state,
            error: None,
            extra: payload,
        }
    }
}

impl From<StatusDocument> for CombinedStatus {
    fn from(document: StatusDocument) -> Self {
        match document {
            StatusDocument {
                error: Some(error), ..
            } => Self::Degraded { error },
            StatusDocument {
                state: None, extra, ..
            } if extra.is_empty() => Self::Missing,
            StatusDocument { state, extra, .. } => Self::Reported { state, extra },
        }
    }
}

impl From<CombinedStatus> for StatusDocument {
    fn from(status: CombinedStatus) -> Self {
        match status {
            CombinedStatus::Missing => Self::default(),
            CombinedStatus::Reported { state, extra } => Self {
                state,
                error: None,
                extra,
            },
            CombinedStatus::Degraded { error } => Self {
                state: None,
                error: Some(error),
                extra: Map::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{CombinedStatus, PullRequest, Review};

    fn review(state: &str) -> Review {
        serde_json::from_value(json!({ "state": state })).expect("review should decode")
    }

    #[rstest]
    #[case::upper("APPROVED", true)]
    #[case::lower("approved", true)]
    #[case::commented("COMMENTED", false)]
    #[case::changes("CHANGES_REQUESTED", false)]
    fn approval_ignores_case(#[case] state: &str, #[case] expected: bool) {
        assert_eq!(review(state).is_approval(), expected);
    }

    #[rstest]
    fn pull_request_keeps_unknown_fields() {
        let payload = json!({
            "number": 12,
            "title": "Add audit",
            "user": { "login": "octocat", "id": 1 },
            "merged_at": "2024-01-15T10:00:00Z",
            "merge_commit_sha": "abc",
            "html_url": "https://github.com/o/r/pull/12",
            "labels": []
        });

        let pull: PullRequest =
            serde_json::from_value(payload.clone()).expect("pull request should decode");

        assert_eq!(pull.author(), Some("octocat"));
        assert!(pull.is_merged());
        assert_eq!(pull.merge_commit(), Some("abc"));
        assert_eq!(
            serde_json::to_value(&pull).expect("pull request should encode"),
            payload
        );
    }

    #[rstest]
    #[case::null(json!({ "number": 1, "merged_at": null }), false)]
    #[case::absent(json!({ "number": 1 }), false)]
    #[case::blank(json!({ "number": 1, "merged_at": "" }), false)]
    #[case::merged(json!({ "number": 1, "merged_at": "2024-02-01T00:00:00Z" }), true)]
    fn merged_requires_timestamp(#[case] payload: serde_json::Value, #[case] expected: bool) {
        let pull: PullRequest = serde_json::from_value(payload).expect("pull request should decode");
        assert_eq!(pull.is_merged(), expected);
    }

    #[rstest]
    #[case::empty(json!({}), CombinedStatus::Missing)]
    #[case::error(
        json!({ "error": "404: Not Found" }),
        CombinedStatus::Degraded { error: "404: Not Found".to_owned() }
    )]
    fn decodes_status_documents(#[case] payload: serde_json::Value, #[case] expected: CombinedStatus) {
        let status: CombinedStatus =
            serde_json::from_value(payload).expect("status should decode");
        assert_eq!(status, expected);
    }

    #[rstest]
    #[case::success(json!({ "state": "success" }), true)]
    #[case::failure(json!({ "state": "failure" }), false)]
    #[case::upper(json!({ "state": "SUCCESS" }), false)]
    #[case::empty(json!({}), false)]
    #[case::degraded(json!({ "error": "500: boom" }), false)]
    fn success_is_exact(#[case] payload: serde_json::Value, #[case] expected: bool) {
        let status: CombinedStatus =
            serde_json::from_value(payload).expect("status should decode");
        assert_eq!(status.is_success(), expected);
    }

    #[rstest]
    #[case::missing(CombinedStatus::Missing, json!({}))]
    #[case::degraded(
        CombinedStatus::Degraded { error: "500: boom".to_owned() },
        json!({ "error": "500: boom" })
    )]
    fn encodes_status_documents(#[case] status: CombinedStatus, #[case] expected: serde_json::Value) {
        assert_eq!(
            serde_json::to_value(&status).expect("status should encode"),
            expected
        );
    }

    #[rstest]
    fn reported_status_keeps_payload() {
        let payload = json!({ "state": "pending", "sha": "abc", "total_count": 2 });
        let map = payload.as_object().cloned().expect("payload is an object");

        let status = CombinedStatus::reported(map);

        assert_eq!(status.state(), Some("pending"));
        assert_eq!(
            serde_json::to_value(&status).expect("status should encode"),
            payload
        );
    }
}
