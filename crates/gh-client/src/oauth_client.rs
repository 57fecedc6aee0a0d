//! Reqwest-based OAuth device flow client
//!
//! The device authorization endpoints live on the web host (`github.com`),
//! not on the REST API, and speak form encoding in both directions. They
//! need no authentication, so a plain reqwest client is enough.

use crate::client::{OAuthClient, DEVICE_GRANT_TYPE};
use crate::error::ApiError;
use crate::types::{AccessTokenResponse, DeviceCodeResponse, TokenPoll};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use std::time::Duration;

const DEVICE_CODE_PATH: &str = "/login/device/code";
const ACCESS_TOKEN_PATH: &str = "/login/oauth/access_token";

/// OAuth client for the device authorization grant
#[derive(Debug, Clone)]
pub struct ReqwestOAuthClient {
    http: Client,
    base_url: String,
}

impl ReqwestOAuthClient {
    /// Create a client for the given web host, e.g. `https://github.com`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gh-pr-tray/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<(StatusCode, String), ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

fn status_error(status: StatusCode) -> ApiError {
    ApiError::Status {
        status: status.as_u16(),
        message: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

#[async_trait]
impl OAuthClient for ReqwestOAuthClient {
    async fn request_device_code(
        &self,
        client_id: &str,
        scope: &str,
    ) -> Result<DeviceCodeResponse, ApiError> {
        debug!("Requesting device code for scope '{}'", scope);
        let (status, body) = self
            .post_form(DEVICE_CODE_PATH, &[("client_id", client_id), ("scope", scope)])
            .await?;

        if status != StatusCode::OK {
            return Err(status_error(status));
        }

        serde_urlencoded::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn poll_access_token(
        &self,
        client_id: &str,
        device_code: &str,
    ) -> Result<TokenPoll, ApiError> {
        let (status, body) = self
            .post_form(
                ACCESS_TOKEN_PATH,
                &[
                    ("client_id", client_id),
                    ("device_code", device_code),
                    ("grant_type", DEVICE_GRANT_TYPE),
                ],
            )
            .await?;

        match status {
            StatusCode::TOO_MANY_REQUESTS => Ok(TokenPoll::RateLimited),
            StatusCode::OK => {
                let reply: AccessTokenResponse = serde_urlencoded::from_str(&body)
                    .map_err(|e| ApiError::Decode(e.to_string()))?;
                Ok(TokenPoll::Reply(reply))
            }
            other => Err(status_error(other)),
        }
    }
}
