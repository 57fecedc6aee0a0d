//! Octocrab-based GitHub API client
//!
//! Direct implementation of the `GitHubClient` trait using the octocrab library.
//! Payloads are decoded into this crate's own types through raw GET requests,
//! so field presence is checked by serde rather than by octocrab's models.

use crate::client::GitHubClient;
use crate::error::ApiError;
use crate::types::{
    CheckRunList, CombinedStatus, Notification, NotificationFilter, PullRequestResource,
};
use async_trait::async_trait;
use log::debug;
use octocrab::Octocrab;
use std::sync::Arc;
use std::time::Duration;

/// Direct GitHub API client using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }

    /// Build a client authenticating with a bearer token
    ///
    /// # Arguments
    ///
    /// * `token` - OAuth access token
    /// * `base_url` - REST API root, e.g. `https://api.github.com`
    /// * `timeout` - Connect and read timeout for every request
    pub fn with_token(token: &str, base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(base_url)
            .map_err(|e| ApiError::Request(e.to_string()))?
            .set_connect_timeout(Some(timeout))
            .set_read_timeout(Some(timeout))
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;
        Ok(Self::new(Arc::new(octocrab)))
    }
}

#[async_trait]
impl GitHubClient for OctocrabClient {
    async fn fetch_notifications(
        &self,
        filter: NotificationFilter,
    ) -> Result<Vec<Notification>, ApiError> {
        debug!(
            "Fetching notifications (participating={}, all={})",
            filter.participating, filter.all
        );
        let notifications: Vec<Notification> =
            self.octocrab.get("/notifications", Some(&filter)).await?;
        debug!("Fetched {} notifications", notifications.len());
        Ok(notifications)
    }

    async fn fetch_pull_request(&self, api_url: &str) -> Result<PullRequestResource, ApiError> {
        debug!("Fetching PR data {}", api_url);
        // Subject URLs are absolute; octocrab only applies its base URI to relative routes
        let pr: PullRequestResource = self.octocrab.get(api_url, None::<&()>).await?;
        Ok(pr)
    }

    async fn fetch_check_runs(
        &self,
        repo_full_name: &str,
        sha: &str,
    ) -> Result<CheckRunList, ApiError> {
        debug!("Fetching check runs for {} @ {}", repo_full_name, sha);
        let route = format!("/repos/{}/commits/{}/check-runs", repo_full_name, sha);
        let runs: CheckRunList = self.octocrab.get(route, None::<&()>).await?;
        Ok(runs)
    }

    async fn fetch_commit_status(
        &self,
        repo_full_name: &str,
        sha: &str,
    ) -> Result<CombinedStatus, ApiError> {
        debug!("Fetching commit status for {} @ {}", repo_full_name, sha);
        let route = format!("/repos/{}/commits/{}/status", repo_full_name, sha);
        let status: CombinedStatus = self.octocrab.get(route, None::<&()>).await?;
        Ok(status)
    }
}
