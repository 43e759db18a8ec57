//! Error types for token acquisition and page fetching

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures surfaced by the client. None of them are recovered locally.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Identity provider rejected the credentials or could not be reached
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A page request returned a non-success status
    #[error("request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// Response body is not a page (e.g. no `value` array)
    #[error("malformed page from {url}: {source}")]
    MalformedPage {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Token contains bytes that cannot appear in a header value
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl ApiError {
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// HTTP status of a failed page request, if that is what this is
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let err = ApiError::Status {
            url: "https://org.crm.dynamics.com/api/data/v9.2/accounts".to_string(),
            status: StatusCode::NOT_FOUND,
            body: "{}".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(!err.is_auth());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_auth_error_display() {
        let err = ApiError::auth("invalid_client");
        assert!(err.is_auth());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "authentication failed: invalid_client");
    }
}
