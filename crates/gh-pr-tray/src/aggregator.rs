//! PR aggregation
//!
//! Turns the notification feed into the two groups shown in the tray:
//! PRs the user authored and PRs the user was asked to review.
//!
//! For every relevant notification the PR resource is fetched and enriched
//! with its build status. Per-item problems (SSO-protected organizations,
//! unresolvable build status) degrade gracefully; anything else aborts the
//! whole listing.

use crate::build_status::resolve_build_status;
use crate::cancel::{until_canceled, Canceled};
use crate::domain_models::{BuildStatus, PullRequest, UserPrs};
use gh_client::{
    ApiError, GitHubClient, Notification, NotificationFilter, NotificationReason,
    SSO_ENFORCEMENT_MESSAGE,
};
use log::{debug, info};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that abort a listing
#[derive(Debug, Error)]
pub enum FetchError {
    /// Unexpected status from the GitHub API
    #[error("Got a '{status} {message}' error from the GitHub API. Please retry in a bit.")]
    Status { status: u16, message: String },

    #[error("Could not build request: {0}")]
    Request(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response from the GitHub API: {0}")]
    Decode(String),

    /// The cycle was torn down
    #[error("Listing canceled")]
    Canceled,
}

impl FetchError {
    /// The token was rejected
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Status { status: 401, .. })
    }
}

impl From<Canceled> for FetchError {
    fn from(_: Canceled) -> Self {
        FetchError::Canceled
    }
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => FetchError::Status { status, message },
            ApiError::SsoProtected => FetchError::Status {
                status: 403,
                message: SSO_ENFORCEMENT_MESSAGE.to_string(),
            },
            ApiError::Request(msg) => FetchError::Request(msg),
            ApiError::Transport(msg) => FetchError::Transport(msg),
            ApiError::Decode(msg) => FetchError::Decode(msg),
        }
    }
}

/// Which group a notification lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Mine,
    Others,
}

impl Bucket {
    fn for_reason(reason: &NotificationReason) -> Option<Self> {
        match reason {
            NotificationReason::Author => Some(Bucket::Mine),
            NotificationReason::ReviewRequested => Some(Bucket::Others),
            NotificationReason::Other => None,
        }
    }
}

/// Lists the PRs relevant to the authenticated user
pub struct PrAggregator<'a> {
    client: &'a dyn GitHubClient,
    pacing: Duration,
}

impl<'a> PrAggregator<'a> {
    /// Create an aggregator
    ///
    /// `pacing` is the delay between two processed notifications. It caps
    /// throughput to stay clear of upstream rate limits, so a listing takes
    /// at least `(n - 1) * pacing` for `n` fetched PRs.
    pub fn new(client: &'a dyn GitHubClient, pacing: Duration) -> Self {
        Self { client, pacing }
    }

    /// Fetch, enrich, dedup and group the user's PRs
    ///
    /// Cancellation is checked before every network call and pacing delay.
    pub async fn list_user_prs(&self, cancel: &CancellationToken) -> Result<UserPrs, FetchError> {
        let notifications = until_canceled(
            cancel,
            self.client.fetch_notifications(NotificationFilter::default()),
        )
        .await??;
        info!("Processing {} notifications", notifications.len());

        let mut prs = UserPrs::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut fetched_any = false;

        for notification in &notifications {
            let Some(bucket) = Bucket::for_reason(&notification.reason) else {
                debug!(
                    "Skipping notification '{}' ({:?})",
                    notification.subject.title, notification.reason
                );
                continue;
            };
            let Some(api_url) = notification.subject.url.as_deref() else {
                debug!(
                    "Skipping notification '{}' without subject URL",
                    notification.subject.title
                );
                continue;
            };

            if fetched_any {
                until_canceled(cancel, tokio::time::sleep(self.pacing)).await?;
            }
            fetched_any = true;

            let Some((repo, pr)) = self.enrich(notification, api_url, &mut seen, cancel).await?
            else {
                continue;
            };

            match bucket {
                Bucket::Mine => prs.mine.push(repo, pr),
                Bucket::Others => prs.others.push(repo, pr),
            }
        }

        info!(
            "Listed {} PRs ({} repos mine, {} repos to review)",
            prs.pr_count(),
            prs.mine.repos().count(),
            prs.others.repos().count()
        );
        Ok(prs)
    }

    /// Resolve one notification to a PR, or `None` if it is to be skipped
    async fn enrich(
        &self,
        notification: &Notification,
        api_url: &str,
        seen: &mut HashSet<String>,
        cancel: &CancellationToken,
    ) -> Result<Option<(String, PullRequest)>, FetchError> {
        let resource = match until_canceled(cancel, self.client.fetch_pull_request(api_url)).await? {
            Ok(resource) => resource,
            Err(ApiError::SsoProtected) => {
                debug!("Skipping {}: organization enforces SSO", api_url);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if resource.merged {
            debug!("Skipping {}: already merged", resource.html_url());
            return Ok(None);
        }

        let url = resource.html_url().to_string();
        if !seen.insert(url.clone()) {
            debug!("Skipping {}: already listed", url);
            return Ok(None);
        }

        let repo = resource
            .head_repo_full_name()
            .or_else(|| notification.repository.as_ref().map(|r| r.full_name.as_str()))
            .unwrap_or_default()
            .to_string();

        let mut build_status = BuildStatus::Pending;
        if let (Some(sha), Some(head_repo)) = (resource.head_sha(), resource.head_repo_full_name())
        {
            build_status = until_canceled(
                cancel,
                resolve_build_status(self.client, head_repo, sha),
            )
            .await?
            .unwrap_or_else(|e| {
                debug!("{}, defaulting to pending", e);
                BuildStatus::Pending
            });
        }

        let mergeable = PullRequest::is_mergeable_state(resource.mergeable_state.as_deref());
        let pr = PullRequest::new(
            url,
            notification.subject.title.clone(),
            mergeable,
            build_status,
        );
        Ok(Some((repo, pr)))
    }
}
