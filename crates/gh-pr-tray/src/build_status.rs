//! Build status resolution
//!
//! GitHub has two independent CI reporting APIs and either may be the
//! authoritative one for a given repository: the Checks API and the legacy
//! combined Status API. Both are consulted, in that order.

use crate::domain_models::BuildStatus;
use gh_client::{CheckRunList, CombinedStatus, GitHubClient};
use log::debug;
use thiserror::Error;

/// Neither endpoint gave a conclusive answer
#[derive(Debug, Error)]
#[error("No conclusive build status for {repo}@{sha}")]
pub struct BuildStatusNotFound {
    pub repo: String,
    pub sha: String,
}

/// Resolve the build status of `sha` in `repo_full_name`
///
/// Fetch failures on one endpoint fall through to the next one; callers
/// default to `BuildStatus::Pending` on `BuildStatusNotFound`.
pub async fn resolve_build_status(
    client: &dyn GitHubClient,
    repo_full_name: &str,
    sha: &str,
) -> Result<BuildStatus, BuildStatusNotFound> {
    match client.fetch_check_runs(repo_full_name, sha).await {
        Ok(runs) => {
            if let Some(status) = from_check_runs(&runs) {
                return Ok(status);
            }
        }
        Err(e) => debug!("Check runs unavailable for {}@{}: {}", repo_full_name, sha, e),
    }

    match client.fetch_commit_status(repo_full_name, sha).await {
        Ok(status) => {
            if let Some(status) = from_combined_status(&status) {
                return Ok(status);
            }
        }
        Err(e) => debug!("Commit status unavailable for {}@{}: {}", repo_full_name, sha, e),
    }

    Err(BuildStatusNotFound {
        repo: repo_full_name.to_string(),
        sha: sha.to_string(),
    })
}

/// The first completed run decides
fn from_check_runs(runs: &CheckRunList) -> Option<BuildStatus> {
    runs.check_runs
        .iter()
        .find(|run| run.is_completed())
        .map(|run| match run.conclusion.as_deref() {
            Some("success") => BuildStatus::Success,
            _ => BuildStatus::Failure,
        })
}

fn from_combined_status(status: &CombinedStatus) -> Option<BuildStatus> {
    match status.state.as_str() {
        "success" => Some(BuildStatus::Success),
        "failure" | "error" => Some(BuildStatus::Failure),
        // pending and anything unknown are inconclusive
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check_runs, FakeGitHub};

    #[tokio::test]
    async fn test_completed_success_check_run() {
        let client =
            FakeGitHub::new().with_check_runs("o/r", "abc", check_runs(&[("completed", Some("success"))]));

        let status = resolve_build_status(&client, "o/r", "abc").await.unwrap();

        assert_eq!(status, BuildStatus::Success);
        // Conclusive on the first endpoint, the legacy one is never asked
        assert_eq!(client.calls(), vec!["check-runs o/r@abc"]);
    }

    #[tokio::test]
    async fn test_first_completed_run_decides() {
        let client = FakeGitHub::new().with_check_runs(
            "o/r",
            "abc",
            check_runs(&[
                ("in_progress", None),
                ("completed", Some("timed_out")),
                ("completed", Some("success")),
            ]),
        );

        let status = resolve_build_status(&client, "o/r", "abc").await.unwrap();

        assert_eq!(status, BuildStatus::Failure);
    }

    #[tokio::test]
    async fn test_no_completed_run_falls_through_to_combined_status() {
        let client = FakeGitHub::new()
            .with_check_runs("o/r", "abc", check_runs(&[("queued", None)]))
            .with_status("o/r", "abc", "failure");

        let status = resolve_build_status(&client, "o/r", "abc").await.unwrap();

        assert_eq!(status, BuildStatus::Failure);
        assert_eq!(
            client.calls(),
            vec!["check-runs o/r@abc", "status o/r@abc"]
        );
    }

    #[tokio::test]
    async fn test_check_runs_error_falls_through() {
        let client = FakeGitHub::new().with_status("o/r", "abc", "success");

        let status = resolve_build_status(&client, "o/r", "abc").await.unwrap();

        assert_eq!(status, BuildStatus::Success);
    }

    #[tokio::test]
    async fn test_combined_error_state_is_failure() {
        let client = FakeGitHub::new().with_status("o/r", "abc", "error");

        assert_eq!(
            resolve_build_status(&client, "o/r", "abc").await.unwrap(),
            BuildStatus::Failure
        );
    }

    #[tokio::test]
    async fn test_nothing_conclusive_is_not_found() {
        let client = FakeGitHub::new()
            .with_check_runs("o/r", "abc", check_runs(&[]))
            .with_status("o/r", "abc", "pending");

        let err = resolve_build_status(&client, "o/r", "abc").await.unwrap_err();

        assert_eq!(err.repo, "o/r");
        assert_eq!(err.sha, "abc");
    }

    #[tokio::test]
    async fn test_both_endpoints_failing_is_not_found() {
        let client = FakeGitHub::new();

        assert!(resolve_build_status(&client, "o/r", "abc").await.is_err());
    }
}
