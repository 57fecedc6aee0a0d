//! GitHub API data transfer objects
//!
//! These types represent the data returned from the GitHub API.
//! They are intentionally separate from application domain models
//! to keep this crate pure and reusable.
//!
//! Fields the application cannot work without are required, so a payload
//! missing them fails to decode. Everything else is optional.

use serde::{Deserialize, Serialize};

/// Why the authenticated user received a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationReason {
    /// The user opened the thread
    Author,
    /// The user was asked to review a pull request
    ReviewRequested,
    /// Any reason the application does not act upon
    #[serde(other)]
    Other,
}

/// A single entry of the notification feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub reason: NotificationReason,
    pub subject: NotificationSubject,
    /// Repository the thread belongs to
    #[serde(default)]
    pub repository: Option<RepositoryRef>,
}

/// The thread a notification points at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSubject {
    pub title: String,
    /// API URL of the subject resource (absent for some subject types)
    #[serde(default)]
    pub url: Option<String>,
    /// Subject type, e.g. "PullRequest" or "Issue"
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Minimal repository reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub full_name: String,
}

/// Query parameters for the notification feed
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NotificationFilter {
    /// Only threads the user is directly participating in
    pub participating: bool,
    /// Include threads already marked as read
    pub all: bool,
}

impl Default for NotificationFilter {
    fn default() -> Self {
        Self {
            participating: true,
            all: true,
        }
    }
}

/// Full pull request resource, as resolved from a notification subject URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestResource {
    /// Whether the PR has already been merged
    pub merged: bool,

    /// Upstream-computed merge state ("clean", "dirty", "blocked", ...)
    #[serde(default)]
    pub mergeable_state: Option<String>,

    #[serde(default)]
    pub head: Option<HeadRef>,

    #[serde(rename = "_links")]
    pub links: PullRequestLinks,
}

impl PullRequestResource {
    /// Canonical browser URL of the PR
    pub fn html_url(&self) -> &str {
        &self.links.html.href
    }

    /// HEAD commit SHA, if GitHub reported one
    pub fn head_sha(&self) -> Option<&str> {
        self.head.as_ref().and_then(|h| h.sha.as_deref())
    }

    /// Full name of the head repository (`owner/name`), if it still exists
    pub fn head_repo_full_name(&self) -> Option<&str> {
        self.head
            .as_ref()
            .and_then(|h| h.repo.as_ref())
            .map(|r| r.full_name.as_str())
    }
}

/// HEAD side of a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadRef {
    #[serde(default)]
    pub sha: Option<String>,
    /// Null when the head fork has been deleted
    #[serde(default)]
    pub repo: Option<RepositoryRef>,
}

/// Hypermedia links of a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestLinks {
    pub html: Link,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// Response of the check-runs endpoint for a commit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRunList {
    #[serde(default)]
    pub check_runs: Vec<CheckRun>,
}

/// A single CI check run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRun {
    /// "queued", "in_progress" or "completed"
    pub status: String,
    /// Only set once the run has completed
    #[serde(default)]
    pub conclusion: Option<String>,
}

impl CheckRun {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

/// Response of the legacy combined-status endpoint for a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedStatus {
    /// "success", "failure", "error" or "pending"
    pub state: String,
}

/// Body of the device-code endpoint (form encoded)
///
/// Every field is optional here: the device flow reports each missing
/// field as its own failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCodeResponse {
    pub device_code: Option<String>,
    pub user_code: Option<String>,
    pub verification_uri: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Minimum number of seconds between token polls
    #[serde(default)]
    pub interval: Option<u64>,
}

/// Body of the access-token endpoint (form encoded)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: Option<String>,
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// RFC 8628 error code such as "authorization_pending" or "slow_down"
    #[serde(default)]
    pub error: Option<String>,
}

/// Outcome of a single access-token poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPoll {
    /// HTTP 429: skip this tick
    RateLimited,
    /// HTTP 200 with a (possibly incomplete) body
    Reply(AccessTokenResponse),
}
