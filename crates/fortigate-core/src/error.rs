//! Error types for Fortigate operations.
//!
//! Request-level failures (timeouts, refused connections, unparseable bodies)
//! are represented here so that provisioning operations can log them and fold
//! them into their outcome. HTTP status codes that the appliance answers with
//! are classified separately by [`crate::status::ApiStatus`].

use thiserror::Error;

/// Main error type for Fortigate operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The appliance could not be reached
    #[error("Appliance unreachable: {0}")]
    ServiceUnavailable(String),

    /// Request timed out
    #[error("Timeout waiting for appliance: {0}")]
    Timeout(String),

    /// HTTP request failed for a reason other than connectivity
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Response body was not the JSON document we expected
    #[error("Failed to parse appliance response: {0}")]
    ParseError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Fortigate operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true when the request never got an answer from the appliance.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::Timeout(_) | Self::HttpError(_)
        )
    }
}

// Conversions from external error types
// The request URL carries the access token, so it never reaches the message.
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let wrap: fn(String) -> Self = if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ServiceUnavailable
        } else if err.is_decode() {
            Self::ParseError
        } else {
            Self::HttpError
        };
        wrap(err.without_url().to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::ServiceUnavailable("test".to_string()).error_code(),
            "SERVICE_UNAVAILABLE"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(
            Error::HttpError("test".to_string()).error_code(),
            "HTTP_ERROR"
        );
        assert_eq!(
            Error::ParseError("test".to_string()).error_code(),
            "PARSE_ERROR"
        );
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::ValidationError("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::ServiceUnavailable("10.0.0.1".to_string());
        assert_eq!(err.to_string(), "Appliance unreachable: 10.0.0.1");

        let err = Error::ParseError("expected value".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to parse appliance response: expected value"
        );
    }

    #[test]
    fn test_is_transport() {
        assert!(Error::Timeout("t".to_string()).is_transport());
        assert!(Error::ServiceUnavailable("t".to_string()).is_transport());
        assert!(Error::HttpError("t".to_string()).is_transport());

        assert!(!Error::ParseError("t".to_string()).is_transport());
        assert!(!Error::ConfigError("t".to_string()).is_transport());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let fg_err: Error = err.into();
        assert!(matches!(fg_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let fg_err: Error = err.into();
        assert!(matches!(fg_err, Error::ParseError(_)));
        assert_eq!(fg_err.error_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::Timeout("test".to_string());
        let err2 = Error::Timeout("test".to_string());
        let err3 = Error::Timeout("other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
        assert_eq!(err1.clone(), err2);
    }
}
