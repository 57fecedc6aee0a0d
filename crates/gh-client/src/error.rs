//! Error type shared by every client in this crate

use thiserror::Error;

/// Message GitHub returns when an organization enforces SAML SSO and the
/// token has not been authorized for it.
pub const SSO_ENFORCEMENT_MESSAGE: &str = "Resource protected by organization SAML enforcement. You must grant your OAuth token access to this organization.";

/// Errors surfaced by the GitHub clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be built (bad URL, bad parameters)
    #[error("Failed to build request: {0}")]
    Request(String),

    /// Network level failure: connection, TLS, timeout
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with an unexpected status code
    #[error("Got a '{status} {message}' error from the GitHub API")]
    Status { status: u16, message: String },

    /// The body did not match the expected shape
    #[error("Unexpected response from the GitHub API: {0}")]
    Decode(String),

    /// The resource belongs to an organization that enforces SSO
    #[error("Resource protected by organization SSO enforcement")]
    SsoProtected,
}

impl ApiError {
    /// Status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::Request(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<octocrab::Error> for ApiError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                if source.message == SSO_ENFORCEMENT_MESSAGE {
                    ApiError::SsoProtected
                } else {
                    ApiError::Status {
                        status: source.status_code.as_u16(),
                        message: source.message,
                    }
                }
            }
            decode @ (octocrab::Error::Serde { .. } | octocrab::Error::Json { .. }) => {
                ApiError::Decode(decode.to_string())
            }
            other => ApiError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let err = ApiError::Status {
            status: 401,
            message: "Bad credentials".to_string(),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(ApiError::SsoProtected.status(), None);
    }

    #[test]
    fn test_status_display_carries_status_text() {
        let err = ApiError::Status {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Got a '502 Bad Gateway' error from the GitHub API"
        );
    }
}
