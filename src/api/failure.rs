//! Classification of failed backend requests.

use reqwest::StatusCode;
use std::fmt;

/// What went wrong with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request was abandoned by the caller.
    Canceled,
    /// The backend could not be reached.
    Network,
    /// The request did not complete in time.
    Timeout,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    RateLimited,
    /// Any 5xx status.
    Server,
    /// Another non-success status.
    Status(u16),
    /// The response body was not what we expected.
    Decode,
    Unknown,
}

impl ApiErrorKind {
    /// Classify an HTTP status code.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::Server,
            other => Self::Status(other),
        }
    }

    /// Stable code, used in logs.
    pub fn code(self) -> &'static str {
        match self {
            Self::Canceled => "CANCELED",
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::Server => "SERVER_ERROR",
            Self::Status(_) => "API_ERROR",
            Self::Decode => "DECODE_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(self) -> String {
        match self {
            Self::Canceled => "Request was canceled".to_string(),
            Self::Network => "Network error. Please check your internet connection.".to_string(),
            Self::Timeout => "Request timed out. Please try again.".to_string(),
            Self::BadRequest => "Bad request".to_string(),
            Self::Unauthorized => "Authentication required".to_string(),
            Self::Forbidden => "Access denied".to_string(),
            Self::NotFound => "Resource not found".to_string(),
            Self::RateLimited => "Too many requests. Please try again later.".to_string(),
            Self::Server => "Server error. Please try again later.".to_string(),
            Self::Status(status) => format!("Error: {status}"),
            Self::Decode => "Unexpected response from server".to_string(),
            Self::Unknown => "An error occurred".to_string(),
        }
    }
}

/// A failed backend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// Underlying cause, for logs.
    pub detail: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn canceled() -> Self {
        Self::new(ApiErrorKind::Canceled, "request canceled")
    }

    /// Error for a non-success response.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(ApiErrorKind::from_status(status), status.to_string())
    }

    /// The backend is unreachable.
    pub fn is_offline(&self) -> bool {
        self.kind == ApiErrorKind::Network
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ApiErrorKind::Timeout
    }

    pub fn is_canceled(&self) -> bool {
        self.kind == ApiErrorKind::Canceled
    }

    /// Whether trying again later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::Network
                | ApiErrorKind::Timeout
                | ApiErrorKind::RateLimited
                | ApiErrorKind::Server
        )
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        self.kind.user_message()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind.user_message(), self.detail)
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ApiErrorKind::Timeout
        } else if let Some(status) = err.status() {
            ApiErrorKind::from_status(status)
        } else if err.is_connect() || err.is_request() {
            ApiErrorKind::Network
        } else if err.is_decode() || err.is_body() {
            ApiErrorKind::Decode
        } else {
            ApiErrorKind::Unknown
        };
        Self::new(kind, err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ApiErrorKind::Decode, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_classification() {
        let cases = [
            (400, ApiErrorKind::BadRequest),
            (401, ApiErrorKind::Unauthorized),
            (403, ApiErrorKind::Forbidden),
            (404, ApiErrorKind::NotFound),
            (429, ApiErrorKind::RateLimited),
            (500, ApiErrorKind::Server),
            (503, ApiErrorKind::Server),
            (418, ApiErrorKind::Status(418)),
        ];
        for (code, kind) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(ApiErrorKind::from_status(status), kind, "status {code}");
        }
    }

    #[test]
    fn test_predicates() {
        let offline = ApiError::new(ApiErrorKind::Network, "refused");
        assert!(offline.is_offline());
        assert!(!offline.is_timeout());

        let timeout = ApiError::new(ApiErrorKind::Timeout, "elapsed");
        assert!(timeout.is_timeout());
        assert!(!timeout.is_offline());
        assert!(timeout.is_retryable());

        assert!(ApiError::canceled().is_canceled());
        assert!(!ApiError::from_status(StatusCode::NOT_FOUND).is_retryable());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS).user_message(),
            "Too many requests. Please try again later."
        );
        assert_eq!(ApiErrorKind::Status(418).user_message(), "Error: 418");
        assert_eq!(ApiErrorKind::Server.code(), "SERVER_ERROR");
    }

    #[test]
    fn test_decode_errors_from_json() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert_eq!(ApiError::from(err).kind, ApiErrorKind::Decode);
    }
}
