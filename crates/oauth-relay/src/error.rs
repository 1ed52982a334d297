//! Error types for the OAuth relay.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Errors from the provider token endpoint call.
#[derive(thiserror::Error, Debug)]
pub enum ExchangeError {
    /// HTTP transport error (connection, DNS, TLS, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned {status}: {}", .error.as_deref().unwrap_or("no error code"))]
    Provider {
        /// HTTP status code
        status: u16,
        /// RFC 6749 `error` code, if the body carried one
        error: Option<String>,
        /// RFC 6749 `error_description`, or the raw body
        description: Option<String>,
    },

    /// Response body could not be decoded
    #[error("Failed to parse token response: {0}")]
    Parse(String),

    /// Success response without an access token
    #[error("Token response is missing access_token")]
    MissingAccessToken,
}

impl ExchangeError {
    /// Create a provider error.
    #[must_use]
    pub fn provider(status: u16, error: Option<String>, description: Option<String>) -> Self {
        Self::Provider { status, error, description }
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(message: impl std::fmt::Display) -> Self {
        Self::Parse(message.to_string())
    }

    /// HTTP status of the provider response, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors terminating a relay request.
///
/// Each variant maps to exactly one HTTP status and a fixed message.
#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("Missing identifier")]
    MissingIdentifier,

    #[error("Missing code")]
    MissingCode,

    #[error("Failed to exchange token")]
    TokenExchangeFailed(#[source] ExchangeError),

    #[error("Identifier not found")]
    NotFound,

    #[error("Failed to create JSON response")]
    SerializationFailed(#[source] serde_json::Error),
}

impl RelayError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingIdentifier | Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::TokenExchangeFailed(_) | Self::SerializationFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ExchangeError> for RelayError {
    fn from(e: ExchangeError) -> Self {
        Self::TokenExchangeFailed(e)
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            match &self {
                Self::TokenExchangeFailed(source) => {
                    tracing::error!(
                        error = %source,
                        provider_status = ?source.status(),
                        "Unable to retrieve token from provider"
                    );
                }
                Self::SerializationFailed(source) => {
                    tracing::error!(error = %source, "Failed to serialize token");
                }
                _ => {}
            }
        }

        let mut response = (status, self.to_string()).into_response();
        response
            .headers_mut()
            .insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        response
    }
}

/// Result type alias for provider exchanges.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Result type alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RelayError::MissingIdentifier.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::MissingCode.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            RelayError::from(ExchangeError::MissingAccessToken).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_are_fixed() {
        assert_eq!(RelayError::MissingIdentifier.to_string(), "Missing identifier");
        assert_eq!(RelayError::NotFound.to_string(), "Identifier not found");

        // Provider detail never leaks into the caller-facing message
        let err = RelayError::from(ExchangeError::provider(
            400,
            Some("invalid_grant".into()),
            Some("Bad code".into()),
        ));
        assert_eq!(err.to_string(), "Failed to exchange token");
    }

    #[test]
    fn test_exchange_error_status() {
        let err = ExchangeError::provider(401, Some("invalid_client".into()), None);
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("invalid_client"));
        assert_eq!(ExchangeError::MissingAccessToken.status(), None);
    }
}
