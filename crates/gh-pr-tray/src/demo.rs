//! Demo mode
//!
//! Canned GitHub answers so every rendering path can be tried without
//! network access or an OAuth app.

use crate::orchestrator::ClientFactory;
use async_trait::async_trait;
use gh_client::types::{HeadRef, Link, PullRequestLinks};
use gh_client::{
    AccessTokenResponse, ApiError, CheckRun, CheckRunList, CombinedStatus, DeviceCodeResponse,
    GitHubClient, Notification, NotificationFilter, NotificationReason, NotificationSubject,
    OAuthClient, PullRequestResource, RepositoryRef, TokenPoll,
};
use gh_pr_config::{Credentials, MemoryCredentialStore};
use std::sync::Arc;

const API: &str = "https://api.github.com/repos";
const WEB: &str = "https://github.com";

pub const DEMO_TOKEN: &str = "demo-token";

struct DemoPr {
    repo: &'static str,
    number: u32,
    title: &'static str,
    reason: NotificationReason,
    merged: bool,
    mergeable_state: &'static str,
    sha: &'static str,
    check_conclusion: Option<&'static str>,
    status: &'static str,
}

const DEMO_PRS: &[DemoPr] = &[
    DemoPr {
        repo: "demo/gh-pr-tray",
        number: 12,
        title: "Add console front-end",
        reason: NotificationReason::Author,
        merged: false,
        mergeable_state: "clean",
        sha: "a1b2c3",
        check_conclusion: Some("success"),
        status: "success",
    },
    DemoPr {
        repo: "demo/gh-pr-tray",
        number: 14,
        title: "Render build status markers",
        reason: NotificationReason::Author,
        merged: false,
        mergeable_state: "dirty",
        sha: "d4e5f6",
        check_conclusion: Some("failure"),
        status: "failure",
    },
    DemoPr {
        repo: "demo/upstream",
        number: 7,
        title: "Bump tokio",
        reason: NotificationReason::ReviewRequested,
        merged: false,
        mergeable_state: "has_hooks",
        sha: "0719ab",
        check_conclusion: None,
        status: "pending",
    },
    DemoPr {
        repo: "demo/upstream",
        number: 3,
        title: "Discuss the roadmap",
        reason: NotificationReason::Other,
        merged: false,
        mergeable_state: "clean",
        sha: "3c3c3c",
        check_conclusion: None,
        status: "pending",
    },
    DemoPr {
        repo: "demo/gh-pr-tray",
        number: 9,
        title: "Initial commit",
        reason: NotificationReason::Author,
        merged: true,
        mergeable_state: "clean",
        sha: "999999",
        check_conclusion: Some("success"),
        status: "success",
    },
];

impl DemoPr {
    fn api_url(&self) -> String {
        format!("{}/{}/pulls/{}", API, self.repo, self.number)
    }

    fn notification(&self) -> Notification {
        Notification {
            reason: self.reason.clone(),
            subject: NotificationSubject {
                title: self.title.to_string(),
                url: Some(self.api_url()),
                kind: Some("PullRequest".to_string()),
            },
            repository: Some(RepositoryRef {
                full_name: self.repo.to_string(),
            }),
        }
    }

    fn resource(&self) -> PullRequestResource {
        PullRequestResource {
            merged: self.merged,
            mergeable_state: Some(self.mergeable_state.to_string()),
            head: Some(HeadRef {
                sha: Some(self.sha.to_string()),
                repo: Some(RepositoryRef {
                    full_name: self.repo.to_string(),
                }),
            }),
            links: PullRequestLinks {
                html: Link {
                    href: format!("{}/{}/pull/{}", WEB, self.repo, self.number),
                },
            },
        }
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Not Found".to_string(),
    }
}

fn find_commit(repo: &str, sha: &str) -> Result<&'static DemoPr, ApiError> {
    DEMO_PRS
        .iter()
        .find(|pr| pr.repo == repo && pr.sha == sha)
        .ok_or_else(not_found)
}

/// GitHub client answering from the demo data set
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoClient;

#[async_trait]
impl GitHubClient for DemoClient {
    async fn fetch_notifications(
        &self,
        _filter: NotificationFilter,
    ) -> Result<Vec<Notification>, ApiError> {
        Ok(DEMO_PRS.iter().map(DemoPr::notification).collect())
    }

    async fn fetch_pull_request(&self, api_url: &str) -> Result<PullRequestResource, ApiError> {
        DEMO_PRS
            .iter()
            .find(|pr| pr.api_url() == api_url)
            .map(DemoPr::resource)
            .ok_or_else(not_found)
    }

    async fn fetch_check_runs(
        &self,
        repo_full_name: &str,
        sha: &str,
    ) -> Result<CheckRunList, ApiError> {
        let pr = find_commit(repo_full_name, sha)?;
        let check_runs = match pr.check_conclusion {
            Some(conclusion) => vec![CheckRun {
                status: "completed".to_string(),
                conclusion: Some(conclusion.to_string()),
            }],
            None => vec![CheckRun {
                status: "in_progress".to_string(),
                conclusion: None,
            }],
        };
        Ok(CheckRunList { check_runs })
    }

    async fn fetch_commit_status(
        &self,
        repo_full_name: &str,
        sha: &str,
    ) -> Result<CombinedStatus, ApiError> {
        let pr = find_commit(repo_full_name, sha)?;
        Ok(CombinedStatus {
            state: pr.status.to_string(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DemoClientFactory;

impl ClientFactory for DemoClientFactory {
    fn client_for(&self, _credentials: &Credentials) -> Result<Arc<dyn GitHubClient>, ApiError> {
        Ok(Arc::new(DemoClient))
    }
}

/// Device flow endpoints that approve on the first poll
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoOAuthClient;

#[async_trait]
impl OAuthClient for DemoOAuthClient {
    async fn request_device_code(
        &self,
        _client_id: &str,
        _scope: &str,
    ) -> Result<DeviceCodeResponse, ApiError> {
        Ok(DeviceCodeResponse {
            device_code: Some("demo-device-code".to_string()),
            user_code: Some("DEMO-CODE".to_string()),
            verification_uri: Some(format!("{}/login/device", WEB)),
            expires_in: Some(900),
            interval: None,
        })
    }

    async fn poll_access_token(
        &self,
        _client_id: &str,
        _device_code: &str,
    ) -> Result<TokenPoll, ApiError> {
        Ok(TokenPoll::Reply(AccessTokenResponse {
            access_token: Some(DEMO_TOKEN.to_string()),
            scope: Some("notifications,repo".to_string()),
            token_type: Some("bearer".to_string()),
            error: None,
        }))
    }
}

/// Credential store that starts out authenticated
pub fn demo_credentials() -> MemoryCredentialStore {
    MemoryCredentialStore::with_credentials(Credentials::new(DEMO_TOKEN, "notifications,repo"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::PrAggregator;
    use crate::domain_models::BuildStatus;
    use gh_pr_config::CredentialStore;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_demo_data_covers_every_marker_path() {
        let prs = PrAggregator::new(&DemoClient, Duration::ZERO)
            .list_user_prs(&CancellationToken::new())
            .await
            .unwrap();

        let mine = prs.mine.get("demo/gh-pr-tray").unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].mergeable);
        assert_eq!(mine[0].build_status, BuildStatus::Success);
        assert!(!mine[1].mergeable);
        assert_eq!(mine[1].build_status, BuildStatus::Failure);

        let others = prs.others.get("demo/upstream").unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].title, "Bump tokio");
        assert_eq!(others[0].build_status, BuildStatus::Pending);
        assert_eq!(others[0].url, "https://github.com/demo/upstream/pull/7");
    }

    #[test]
    fn test_demo_store_is_authenticated() {
        let store = demo_credentials();
        assert!(store.exists());
        assert_eq!(store.load().unwrap().token, DEMO_TOKEN);
    }

    #[tokio::test]
    async fn test_unknown_pr_is_not_found() {
        let err = DemoClient
            .fetch_pull_request("https://api.github.com/repos/x/y/pulls/1")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
