//! Pull Request model
//!
//! Domain model for the PRs shown in the tray, grouped by repository.

use indexmap::IndexMap;

/// CI outcome for the head commit of a PR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildStatus {
    /// No conclusive result (yet)
    #[default]
    Pending,
    Success,
    Failure,
    Canceled,
}

/// A GitHub Pull Request, as shown in the tray
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Canonical HTML URL; also the dedup key
    pub url: String,
    /// PR title
    pub title: String,
    /// Whether GitHub reports the PR as mergeable without conflicts
    pub mergeable: bool,
    /// Build status of the HEAD commit
    pub build_status: BuildStatus,
}

impl PullRequest {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        mergeable: bool,
        build_status: BuildStatus,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            mergeable,
            build_status,
        }
    }

    /// Whether a `mergeable_state` value means the PR can be merged
    pub fn is_mergeable_state(state: Option<&str>) -> bool {
        matches!(state, Some("clean") | Some("has_hooks"))
    }
}

/// PRs grouped by repository full name
///
/// Groups keep the order in which their repository was first seen, and are
/// only created together with their first member, so no group is ever empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrGroups {
    groups: IndexMap<String, Vec<PullRequest>>,
}

impl PrGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a PR to the group of `repo`, creating the group if needed
    pub fn push(&mut self, repo: impl Into<String>, pr: PullRequest) {
        self.groups.entry(repo.into()).or_default().push(pr);
    }

    /// Iterate groups in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PullRequest])> {
        self.groups
            .iter()
            .map(|(repo, prs)| (repo.as_str(), prs.as_slice()))
    }

    /// Repository names in first-seen order
    pub fn repos(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn get(&self, repo: &str) -> Option<&[PullRequest]> {
        self.groups.get(repo).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of PRs across all groups
    pub fn pr_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Result of one aggregation: PRs authored by the user and PRs awaiting
/// the user's review
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPrs {
    pub mine: PrGroups,
    pub others: PrGroups,
}

impl UserPrs {
    pub fn pr_count(&self) -> usize {
        self.mine.pr_count() + self.others.pr_count()
    }
}
