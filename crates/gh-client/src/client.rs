//! GitHub client traits
//!
//! This module defines the `GitHubClient` trait for the authenticated REST
//! API and the `OAuthClient` trait for the device authorization endpoints.
//! Application code only ever talks to these traits, so tests and demo mode
//! can swap in canned implementations.

use crate::error::ApiError;
use crate::types::{
    CheckRunList, CombinedStatus, DeviceCodeResponse, Notification, NotificationFilter,
    PullRequestResource, TokenPoll,
};
use async_trait::async_trait;

/// Grant type sent when polling for the access token
pub const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Authenticated GitHub REST API client
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{GitHubClient, NotificationFilter};
///
/// async fn count(client: &dyn GitHubClient) -> Result<usize, gh_client::ApiError> {
///     Ok(client.fetch_notifications(NotificationFilter::default()).await?.len())
/// }
/// ```
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Fetch the authenticated user's notification feed
    ///
    /// Non-2xx responses surface as `ApiError::Status`.
    async fn fetch_notifications(
        &self,
        filter: NotificationFilter,
    ) -> Result<Vec<Notification>, ApiError>;

    /// Resolve a notification subject URL to the full pull request resource
    ///
    /// Returns `ApiError::SsoProtected` when the organization enforces SSO
    /// and the token has not been granted access.
    async fn fetch_pull_request(&self, api_url: &str) -> Result<PullRequestResource, ApiError>;

    /// Fetch CI check runs for a commit
    ///
    /// # Arguments
    ///
    /// * `repo_full_name` - Repository as `owner/name`
    /// * `sha` - The commit SHA to get checks for
    async fn fetch_check_runs(
        &self,
        repo_full_name: &str,
        sha: &str,
    ) -> Result<CheckRunList, ApiError>;

    /// Fetch combined commit status
    ///
    /// This uses the legacy Status API which some CI systems still use
    /// (as opposed to the newer Checks API).
    async fn fetch_commit_status(
        &self,
        repo_full_name: &str,
        sha: &str,
    ) -> Result<CombinedStatus, ApiError>;
}

/// Client for the OAuth device authorization endpoints
#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// Request a device code and user code
    ///
    /// Any status other than 200 is reported as `ApiError::Status`.
    async fn request_device_code(
        &self,
        client_id: &str,
        scope: &str,
    ) -> Result<DeviceCodeResponse, ApiError>;

    /// Poll once for the access token
    ///
    /// 429 is reported as `TokenPoll::RateLimited`, any other status
    /// besides 200 as `ApiError::Status`.
    async fn poll_access_token(
        &self,
        client_id: &str,
        device_code: &str,
    ) -> Result<TokenPoll, ApiError>;
}
