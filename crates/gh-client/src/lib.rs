//! GitHub API clients for the PR tray
//!
//! This crate provides two trait-based clients:
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │      GitHubClient trait      │   │      OAuthClient trait       │
//! │  - fetch_notifications()     │   │  - request_device_code()     │
//! │  - fetch_pull_request()      │   │  - poll_access_token()       │
//! │  - fetch_check_runs()        │   └──────────────────────────────┘
//! │  - fetch_commit_status()     │                  │
//! └──────────────────────────────┘                  ▼
//!                │                      ┌──────────────────────┐
//!                ▼                      │  ReqwestOAuthClient  │
//!      ┌─────────────────┐              │  (form encoded)      │
//!      │ OctocrabClient  │              └──────────────────────┘
//!      │ (REST API)      │
//!      └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_client::{GitHubClient, NotificationFilter, OctocrabClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), gh_client::ApiError> {
//! let client = OctocrabClient::with_token(
//!     "token",
//!     "https://api.github.com",
//!     Duration::from_secs(30),
//! )?;
//! let notifications = client
//!     .fetch_notifications(NotificationFilter::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod oauth_client;
pub mod octocrab_client;
pub mod types;

pub use client::{GitHubClient, OAuthClient, DEVICE_GRANT_TYPE};
pub use error::{ApiError, SSO_ENFORCEMENT_MESSAGE};
pub use oauth_client::ReqwestOAuthClient;
pub use octocrab_client::OctocrabClient;
pub use types::{
    AccessTokenResponse, CheckRun, CheckRunList, CombinedStatus, DeviceCodeResponse,
    Notification, NotificationFilter, NotificationReason, NotificationSubject,
    PullRequestResource, RepositoryRef, TokenPoll,
};
