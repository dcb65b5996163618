//! Brokkr error types

use serde::{Deserialize, Serialize};

/// Brokkr error types
#[derive(Debug, thiserror::Error)]
pub enum BrokkrError {
    /// Model short name is not in the catalog.
    #[error("unknown model '{model}'. Available: {available}")]
    UnknownModel { model: String, available: String },

    /// Caller input failed validation — never reaches the invocation service.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The Bedrock runtime call failed. Surfaced verbatim, no retries.
    #[error("provider error ({cause}): {message}")]
    Provider {
        cause: ProviderErrorCause,
        message: String,
    },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl BrokkrError {
    /// Construct an `UnknownModel` error listing the available short names.
    pub fn unknown_model(model: impl Into<String>, available: &[&str]) -> Self {
        Self::UnknownModel {
            model: model.into(),
            available: available.join(", "),
        }
    }

    /// Construct a provider error with a cause.
    pub fn provider(cause: ProviderErrorCause, message: impl Into<String>) -> Self {
        Self::Provider {
            cause,
            message: message.into(),
        }
    }
}

/// Why an invocation service call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorCause {
    Throttled,
    Timeout,
    InvalidCredentials,
    MalformedRequest,
    Unknown,
}

impl std::fmt::Display for ProviderErrorCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Throttled => "throttled",
            Self::Timeout => "timeout",
            Self::InvalidCredentials => "invalid_credentials",
            Self::MalformedRequest => "malformed_request",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Result type alias for Brokkr operations
pub type Result<T> = std::result::Result<T, BrokkrError>;
