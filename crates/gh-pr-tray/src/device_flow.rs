//! OAuth device authorization flow
//!
//! ```text
//! request device code ──► show user code ──► poll token endpoint ──► save
//!        │                  (clipboard,          │  429 / pending /
//!        ▼                   info, browser)      │  slow_down: wait
//!   Missing* errors                              ▼
//!                                  Denied / Timeout / Api errors
//! ```
//!
//! Every wait and every network call is raced against the cycle's
//! cancellation token. A canceled flow never writes credentials.

use crate::cancel::{until_canceled, Canceled};
use crate::desktop::Desktop;
use gh_client::{AccessTokenResponse, ApiError, OAuthClient, TokenPoll};
use gh_pr_config::{AppConfig, CredentialStore, Credentials};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Extra delay requested by a `slow_down` answer
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Could not build request: {0}")]
    Request(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Got a '{status} {message}' error from GitHub")]
    Api { status: u16, message: String },

    #[error("Unexpected response from GitHub: {0}")]
    Decode(String),

    #[error("GitHub did not return a device code")]
    MissingDeviceCode,

    #[error("GitHub did not return a user code")]
    MissingUserCode,

    #[error("GitHub did not return a verification uri")]
    MissingVerificationUri,

    #[error("The authorization request was denied")]
    Denied,

    #[error("The device code expired before the authorization was completed")]
    Timeout,

    #[error("Could not save credentials: {0}")]
    Storage(String),

    #[error("Authorization canceled")]
    Canceled,
}

impl AuthError {
    /// Title and message to show the user, `None` for silent outcomes
    pub fn dialog(&self) -> Option<(&'static str, String)> {
        let title = match self {
            AuthError::Canceled => return None,
            AuthError::Request(_)
            | AuthError::Transport(_)
            | AuthError::Api { .. }
            | AuthError::Decode(_) => "GitHub API error",
            AuthError::MissingDeviceCode => "Missing device code!",
            AuthError::MissingUserCode => "Missing user code!",
            AuthError::MissingVerificationUri => "Missing verification uri!",
            AuthError::Denied => "Access denied",
            AuthError::Timeout => "Timeout",
            AuthError::Storage(_) => "Could not save credentials",
        };
        Some((title, self.to_string()))
    }
}

impl From<Canceled> for AuthError {
    fn from(_: Canceled) -> Self {
        AuthError::Canceled
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Request(msg) => AuthError::Request(msg),
            ApiError::Transport(msg) => AuthError::Transport(msg),
            ApiError::Status { status, message } => AuthError::Api { status, message },
            ApiError::Decode(msg) => AuthError::Decode(msg),
            ApiError::SsoProtected => AuthError::Api {
                status: 403,
                message: "Forbidden".to_string(),
            },
        }
    }
}

/// Parameters of the device flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFlowSettings {
    pub client_id: String,
    pub scope: String,
    /// Minimum spacing between two token polls
    pub poll_interval: Duration,
    /// Polling stops after this much time
    pub timeout: Duration,
}

impl DeviceFlowSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            scope: config.scope.clone(),
            poll_interval: config.device_poll_interval(),
            timeout: config.device_poll_timeout(),
        }
    }
}

/// Codes the user needs to complete the authorization
#[derive(Debug)]
struct DeviceCode {
    device_code: String,
    user_code: String,
    verification_uri: String,
    interval: Option<Duration>,
}

/// What one token poll told us
#[derive(Debug)]
enum PollOutcome {
    Wait,
    SlowDown,
    Granted(Credentials),
}

/// Drives the device flow against the OAuth endpoints
pub struct DeviceAuthFlow {
    oauth: Arc<dyn OAuthClient>,
    store: Arc<dyn CredentialStore>,
    desktop: Arc<dyn Desktop>,
    settings: DeviceFlowSettings,
}

impl DeviceAuthFlow {
    pub fn new(
        oauth: Arc<dyn OAuthClient>,
        store: Arc<dyn CredentialStore>,
        desktop: Arc<dyn Desktop>,
        settings: DeviceFlowSettings,
    ) -> Self {
        Self {
            oauth,
            store,
            desktop,
            settings,
        }
    }

    /// Run the whole flow, persisting the credentials on success
    pub async fn authenticate(&self, cancel: &CancellationToken) -> Result<Credentials, AuthError> {
        let code = self.request_device_code(cancel).await?;
        self.prompt_user(&code, cancel)?;

        let mut interval = self.settings.poll_interval.max(code.interval.unwrap_or_default());
        let started = Instant::now();
        info!(
            "Polling for access token every {:?} for up to {:?}",
            interval, self.settings.timeout
        );

        loop {
            until_canceled(cancel, tokio::time::sleep(interval)).await?;

            if started.elapsed() > self.settings.timeout {
                warn!("Device flow timed out after {:?}", started.elapsed());
                return Err(AuthError::Timeout);
            }

            let poll = until_canceled(
                cancel,
                self.oauth
                    .poll_access_token(&self.settings.client_id, &code.device_code),
            )
            .await?;

            let reply = match poll {
                Ok(TokenPoll::Reply(reply)) => reply,
                Ok(TokenPoll::RateLimited) => {
                    debug!("Token endpoint rate limited, waiting for the next tick");
                    continue;
                }
                Err(ApiError::Transport(e)) => {
                    warn!("Token poll failed, retrying: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match self.evaluate(reply)? {
                PollOutcome::Wait => continue,
                PollOutcome::SlowDown => {
                    interval += SLOW_DOWN_STEP;
                    debug!("Asked to slow down, polling every {:?} now", interval);
                }
                PollOutcome::Granted(credentials) => {
                    if cancel.is_cancelled() {
                        return Err(AuthError::Canceled);
                    }
                    self.store
                        .save(&credentials)
                        .map_err(|e| AuthError::Storage(format!("{:#}", e)))?;
                    info!("Device flow completed with scope '{}'", credentials.scope);
                    return Ok(credentials);
                }
            }
        }
    }

    async fn request_device_code(&self, cancel: &CancellationToken) -> Result<DeviceCode, AuthError> {
        let reply = until_canceled(
            cancel,
            self.oauth
                .request_device_code(&self.settings.client_id, &self.settings.scope),
        )
        .await??;

        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        let device_code = present(reply.device_code).ok_or(AuthError::MissingDeviceCode)?;
        let user_code = present(reply.user_code).ok_or(AuthError::MissingUserCode)?;
        let verification_uri =
            present(reply.verification_uri).ok_or(AuthError::MissingVerificationUri)?;

        Ok(DeviceCode {
            device_code,
            user_code,
            verification_uri,
            interval: reply.interval.map(Duration::from_secs),
        })
    }

    /// Clipboard, instructions and browser
    ///
    /// Neither a clipboard nor a browser failure ends the flow: the user can
    /// still type the code shown in the instructions.
    fn prompt_user(&self, code: &DeviceCode, cancel: &CancellationToken) -> Result<(), AuthError> {
        if cancel.is_cancelled() {
            return Err(AuthError::Canceled);
        }

        if let Err(e) = self.desktop.copy_to_clipboard(&code.user_code) {
            warn!("{}", e);
        }

        self.desktop.show_info(
            "GitHub setup",
            &format!(
                "Enter the code {} at {} to authorize gh-pr-tray. The code has been copied to your clipboard.",
                code.user_code, code.verification_uri
            ),
        );

        if let Err(e) = self.desktop.open_url(&code.verification_uri) {
            self.desktop.show_error(
                "Error opening the browser",
                &format!("{}. Please open {} manually.", e, code.verification_uri),
            );
        }
        Ok(())
    }

    fn evaluate(&self, reply: AccessTokenResponse) -> Result<PollOutcome, AuthError> {
        if let Some(error) = reply.error.as_deref() {
            match error {
                "authorization_pending" => return Ok(PollOutcome::Wait),
                "slow_down" => return Ok(PollOutcome::SlowDown),
                "access_denied" => return Err(AuthError::Denied),
                "expired_token" => return Err(AuthError::Timeout),
                other => {
                    warn!("Token endpoint answered '{}', polling on", other);
                    return Ok(PollOutcome::Wait);
                }
            }
        }

        let token = reply.access_token.filter(|t| !t.is_empty());
        let scope = reply.scope.filter(|s| !s.is_empty());
        match (token, scope) {
            (None, _) => {
                debug!("No access token yet");
                Ok(PollOutcome::Wait)
            }
            (Some(_), None) => {
                self.desktop.show_error(
                    "Missing scopes!",
                    "GitHub returned a token without scopes, retrying.",
                );
                Ok(PollOutcome::Wait)
            }
            (Some(token), Some(scope)) => Ok(PollOutcome::Granted(Credentials::new(token, scope))),
        }
    }
}
