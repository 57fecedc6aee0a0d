//! Mock collaborators shared by the unit tests

use crate::desktop::{Desktop, DesktopError};
use crate::menu::MenuSurface;
use crate::selector::EntrySource;
use async_trait::async_trait;
use gh_client::types::{HeadRef, Link, PullRequestLinks};
use gh_client::{
    ApiError, CheckRun, CheckRunList, CombinedStatus, DeviceCodeResponse, GitHubClient,
    Notification, NotificationFilter, NotificationReason, NotificationSubject, OAuthClient,
    PullRequestResource, RepositoryRef, TokenPoll,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

pub fn notification(reason: NotificationReason, title: &str, api_url: &str) -> Notification {
    Notification {
        reason,
        subject: NotificationSubject {
            title: title.to_string(),
            url: Some(api_url.to_string()),
            kind: Some("PullRequest".to_string()),
        },
        repository: None,
    }
}

pub fn pr_resource(
    html_url: &str,
    merged: bool,
    mergeable_state: Option<&str>,
    head: Option<(&str, &str)>,
) -> PullRequestResource {
    PullRequestResource {
        merged,
        mergeable_state: mergeable_state.map(str::to_string),
        head: head.map(|(sha, repo)| HeadRef {
            sha: Some(sha.to_string()),
            repo: Some(RepositoryRef {
                full_name: repo.to_string(),
            }),
        }),
        links: PullRequestLinks {
            html: Link {
                href: html_url.to_string(),
            },
        },
    }
}

pub fn check_runs(runs: &[(&str, Option<&str>)]) -> CheckRunList {
    CheckRunList {
        check_runs: runs
            .iter()
            .map(|(status, conclusion)| CheckRun {
                status: status.to_string(),
                conclusion: conclusion.map(str::to_string),
            })
            .collect(),
    }
}

/// Canned failure, turned into a fresh `ApiError` on every call
#[derive(Debug, Clone, Copy)]
pub enum FakeFailure {
    Status(u16),
    Sso,
    Transport,
}

impl FakeFailure {
    fn to_error(self) -> ApiError {
        match self {
            FakeFailure::Status(status) => ApiError::Status {
                status,
                message: "Scripted".to_string(),
            },
            FakeFailure::Sso => ApiError::SsoProtected,
            FakeFailure::Transport => ApiError::Transport("connection reset".to_string()),
        }
    }
}

/// Scripted GitHub REST client
#[derive(Debug, Default)]
pub struct FakeGitHub {
    notifications: Vec<Notification>,
    notifications_failure: Option<FakeFailure>,
    pull_requests: HashMap<String, Result<PullRequestResource, FakeFailure>>,
    check_runs: HashMap<String, CheckRunList>,
    statuses: HashMap<String, CombinedStatus>,
    calls: Mutex<Vec<String>>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    pub fn failing_notifications(mut self, failure: FakeFailure) -> Self {
        self.notifications_failure = Some(failure);
        self
    }

    pub fn with_pull_request(mut self, api_url: &str, pr: PullRequestResource) -> Self {
        self.pull_requests.insert(api_url.to_string(), Ok(pr));
        self
    }

    pub fn failing_pull_request(mut self, api_url: &str, failure: FakeFailure) -> Self {
        self.pull_requests.insert(api_url.to_string(), Err(failure));
        self
    }

    pub fn with_check_runs(mut self, repo: &str, sha: &str, runs: CheckRunList) -> Self {
        self.check_runs.insert(format!("{}@{}", repo, sha), runs);
        self
    }

    pub fn with_status(mut self, repo: &str, sha: &str, state: &str) -> Self {
        self.statuses.insert(
            format!("{}@{}", repo, sha),
            CombinedStatus {
                state: state.to_string(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GitHubClient for FakeGitHub {
    async fn fetch_notifications(
        &self,
        _filter: NotificationFilter,
    ) -> Result<Vec<Notification>, ApiError> {
        self.record("notifications".to_string());
        match self.notifications_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(self.notifications.clone()),
        }
    }

    async fn fetch_pull_request(&self, api_url: &str) -> Result<PullRequestResource, ApiError> {
        self.record(format!("pr {}", api_url));
        match self.pull_requests.get(api_url) {
            Some(Ok(pr)) => Ok(pr.clone()),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Err(FakeFailure::Status(404).to_error()),
        }
    }

    async fn fetch_check_runs(
        &self,
        repo_full_name: &str,
        sha: &str,
    ) -> Result<CheckRunList, ApiError> {
        let key = format!("{}@{}", repo_full_name, sha);
        self.record(format!("check-runs {}", key));
        self.check_runs
            .get(&key)
            .cloned()
            .ok_or_else(|| FakeFailure::Status(404).to_error())
    }

    async fn fetch_commit_status(
        &self,
        repo_full_name: &str,
        sha: &str,
    ) -> Result<CombinedStatus, ApiError> {
        let key = format!("{}@{}", repo_full_name, sha);
        self.record(format!("status {}", key));
        self.statuses
            .get(&key)
            .cloned()
            .ok_or_else(|| FakeFailure::Status(404).to_error())
    }
}

/// One scripted answer of the token endpoint
#[derive(Debug, Clone)]
pub enum ScriptedPoll {
    RateLimited,
    Pending,
    Error(&'static str),
    TokenWithoutScope(&'static str),
    Token(&'static str, &'static str),
    Fail(FakeFailure),
}

/// Scripted OAuth device flow endpoints
///
/// Once the poll script is exhausted every further poll answers "pending".
#[derive(Debug)]
pub struct ScriptedOAuth {
    device_code: Mutex<Option<Result<DeviceCodeResponse, FakeFailure>>>,
    polls: Mutex<VecDeque<ScriptedPoll>>,
    poll_times: Mutex<Vec<Instant>>,
}

impl ScriptedOAuth {
    pub fn new(polls: Vec<ScriptedPoll>) -> Self {
        Self {
            device_code: Mutex::new(Some(Ok(Self::complete_device_code()))),
            polls: Mutex::new(polls.into()),
            poll_times: Mutex::new(Vec::new()),
        }
    }

    pub fn complete_device_code() -> DeviceCodeResponse {
        DeviceCodeResponse {
            device_code: Some("device-123".to_string()),
            user_code: Some("WDJB-MJHT".to_string()),
            verification_uri: Some("https://github.com/login/device".to_string()),
            expires_in: Some(900),
            interval: None,
        }
    }

    pub fn with_device_code(self, reply: DeviceCodeResponse) -> Self {
        *self.device_code.lock().unwrap() = Some(Ok(reply));
        self
    }

    pub fn failing_device_code(self, failure: FakeFailure) -> Self {
        *self.device_code.lock().unwrap() = Some(Err(failure));
        self
    }

    pub fn poll_count(&self) -> usize {
        self.poll_times.lock().unwrap().len()
    }

    pub fn poll_times(&self) -> Vec<Instant> {
        self.poll_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl OAuthClient for ScriptedOAuth {
    async fn request_device_code(
        &self,
        _client_id: &str,
        _scope: &str,
    ) -> Result<DeviceCodeResponse, ApiError> {
        match self.device_code.lock().unwrap().clone() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Err(FakeFailure::Status(500).to_error()),
        }
    }

    async fn poll_access_token(
        &self,
        _client_id: &str,
        device_code: &str,
    ) -> Result<TokenPoll, ApiError> {
        assert_eq!(device_code, "device-123");
        self.poll_times.lock().unwrap().push(Instant::now());
        let next = self
            .polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ScriptedPoll::Pending);

        let reply = |access_token: Option<&str>, scope: Option<&str>, error: Option<&str>| {
            TokenPoll::Reply(gh_client::AccessTokenResponse {
                access_token: access_token.map(str::to_string),
                scope: scope.map(str::to_string),
                token_type: None,
                error: error.map(str::to_string),
            })
        };

        match next {
            ScriptedPoll::RateLimited => Ok(TokenPoll::RateLimited),
            ScriptedPoll::Pending => Ok(reply(None, None, Some("authorization_pending"))),
            ScriptedPoll::Error(code) => Ok(reply(None, None, Some(code))),
            ScriptedPoll::TokenWithoutScope(token) => Ok(reply(Some(token), None, None)),
            ScriptedPoll::Token(token, scope) => Ok(reply(Some(token), Some(scope), None)),
            ScriptedPoll::Fail(failure) => Err(failure.to_error()),
        }
    }
}

/// Desktop side effect that was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesktopCall {
    Clipboard(String),
    OpenUrl(String),
    Error(String, String),
    Info(String, String),
}

#[derive(Debug, Default)]
pub struct RecordingDesktop {
    calls: Mutex<Vec<DesktopCall>>,
    fail_browser: bool,
}

impl RecordingDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broken_browser() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_browser: true,
        }
    }

    pub fn calls(&self) -> Vec<DesktopCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn error_titles(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DesktopCall::Error(title, _) => Some(title),
                _ => None,
            })
            .collect()
    }
}

impl Desktop for RecordingDesktop {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), DesktopError> {
        self.calls
            .lock()
            .unwrap()
            .push(DesktopCall::Clipboard(text.to_string()));
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), DesktopError> {
        self.calls
            .lock()
            .unwrap()
            .push(DesktopCall::OpenUrl(url.to_string()));
        if self.fail_browser {
            return Err(DesktopError::Browser("no browser".to_string()));
        }
        Ok(())
    }

    fn show_error(&self, title: &str, message: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(DesktopCall::Error(title.to_string(), message.to_string()));
    }

    fn show_info(&self, title: &str, message: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(DesktopCall::Info(title.to_string(), message.to_string()));
    }
}

/// Mutation applied to the rendered entry set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOp {
    Reset,
    Label(String),
    Entry(String),
    Separator,
}

/// Menu surface that records every mutation and keeps the live sources
#[derive(Default)]
pub struct RecordingMenu {
    ops: Mutex<Vec<MenuOp>>,
    sources: Mutex<Vec<(String, EntrySource)>>,
}

impl RecordingMenu {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ops(&self) -> Vec<MenuOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Ops recorded since the last reset
    pub fn current(&self) -> Vec<MenuOp> {
        let ops = self.ops();
        match ops.iter().rposition(|op| *op == MenuOp::Reset) {
            Some(pos) => ops[pos + 1..].to_vec(),
            None => ops,
        }
    }

    /// Fire the live entry with the given label
    pub fn click(&self, label: &str) -> bool {
        let sources = self.sources.lock().unwrap();
        match sources.iter().find(|(text, _)| text == label) {
            Some((_, source)) => source.fire(),
            None => false,
        }
    }
}

impl MenuSurface for RecordingMenu {
    fn reset(&self) {
        self.ops.lock().unwrap().push(MenuOp::Reset);
        self.sources.lock().unwrap().clear();
    }

    fn add_label(&self, text: &str) {
        self.ops.lock().unwrap().push(MenuOp::Label(text.to_string()));
    }

    fn add_entry(&self, text: &str, source: EntrySource) {
        self.ops.lock().unwrap().push(MenuOp::Entry(text.to_string()));
        self.sources
            .lock()
            .unwrap()
            .push((text.to_string(), source));
    }

    fn add_separator(&self) {
        self.ops.lock().unwrap().push(MenuOp::Separator);
    }
}
