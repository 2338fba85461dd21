//! Core error types

use thiserror::Error;

/// Coarse grouping of errors, used for logging and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    RateLimit,
    Client,
    Server,
    Parsing,
    Configuration,
    Stream,
    Internal,
}

/// Library error type
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport-level failure (connection refused, body read error, ...)
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Non-success response from the provider
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceededError(String),

    #[error("Request timed out: {0}")]
    TimeoutError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl LlmError {
    /// Create an `ApiError` without details
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create an `ApiError` carrying structured details
    pub fn api_error_with_details(
        code: u16,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// HTTP status code, when the error originated from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::TimeoutError(_) => ErrorCategory::Network,
            Self::AuthenticationError(_) | Self::MissingApiKey(_) => {
                ErrorCategory::Authentication
            }
            Self::RateLimitError(_) | Self::QuotaExceededError(_) => ErrorCategory::RateLimit,
            Self::ApiError { code, .. } if *code >= 500 => ErrorCategory::Server,
            Self::ApiError { .. } | Self::NotFound(_) | Self::InvalidInput(_) => {
                ErrorCategory::Client
            }
            Self::ParseError(_) | Self::JsonError(_) => ErrorCategory::Parsing,
            Self::StreamError(_) => ErrorCategory::Stream,
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
            Self::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::RateLimit | ErrorCategory::Server
        ) && !matches!(self, Self::QuotaExceededError(_))
    }

    /// Whether the error is caused by the credentials
    pub fn is_auth_error(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let err = LlmError::api_error(502, "bad gateway");
        assert_eq!(err.category(), ErrorCategory::Server);
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), Some(502));
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = LlmError::api_error(422, "unprocessable");
        assert_eq!(err.category(), ErrorCategory::Client);
        assert!(!err.is_retryable());

        assert!(!LlmError::AuthenticationError("bad key".into()).is_retryable());
        assert!(!LlmError::QuotaExceededError("out of credits".into()).is_retryable());
    }

    #[test]
    fn timeouts_and_rate_limits_are_retryable() {
        assert!(LlmError::TimeoutError("slow".into()).is_retryable());
        assert!(LlmError::RateLimitError("429".into()).is_retryable());
    }

    #[test]
    fn display_includes_message() {
        let err = LlmError::AuthenticationError("MakeHub: Invalid API key.".into());
        assert_eq!(
            err.to_string(),
            "Authentication error: MakeHub: Invalid API key."
        );
        assert!(err.is_auth_error());
    }
}
