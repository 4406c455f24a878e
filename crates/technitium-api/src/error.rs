//! Error taxonomy surfaced by the dispatcher.
//!
//! Nothing here is retried automatically; retry policy belongs to callers.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Failures produced by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid local settings (base URL, credentials, token).
    /// Raised before any network I/O.
    #[error("configuration error: {message}")]
    Configuration {
        /// Human-readable description.
        message: String,
    },
    /// The server answered with a non-2xx status.
    #[error("{endpoint} ({path}) failed with HTTP {status} {status_text}")]
    Http {
        /// Endpoint identifier.
        endpoint: String,
        /// Endpoint path.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase.
        status_text: String,
        /// Decoded JSON error body, when the response declared JSON and parsed.
        payload: Option<Value>,
    },
    /// The server answered 2xx but the envelope reported a failure.
    #[error("{endpoint} ({path}) returned '{status}': {message}")]
    Api {
        /// Endpoint identifier.
        endpoint: String,
        /// Endpoint path.
        path: String,
        /// Envelope status (e.g. `error`, `invalid-token`).
        status: String,
        /// Envelope `errorMessage`, or a fallback description.
        message: String,
        /// Full decoded envelope.
        payload: Value,
    },
    /// The call exceeded its budget and was aborted.
    #[error("{endpoint} timed out after {}ms", .budget.as_millis())]
    Timeout {
        /// Endpoint identifier.
        endpoint: String,
        /// Budget that elapsed.
        budget: Duration,
    },
    /// The caller's cancel signal fired before the call completed.
    #[error("{endpoint} was cancelled: {reason}")]
    Cancelled {
        /// Endpoint identifier.
        endpoint: String,
        /// Reason supplied with the signal.
        reason: String,
    },
    /// The endpoint identifier is not in the catalog.
    #[error("unknown endpoint '{id}'")]
    NotFound {
        /// Requested identifier.
        id: String,
        /// Every registered identifier, sorted.
        known: Vec<&'static str>,
    },
    /// The request never produced an HTTP response (DNS, connect, TLS, I/O).
    #[error("request to {endpoint} failed")]
    Transport {
        /// Endpoint identifier.
        endpoint: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// A response that declared JSON could not be decoded.
    #[error("could not decode response from {endpoint}")]
    Decode {
        /// Endpoint identifier.
        endpoint: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the server rejected the session token.
    #[must_use]
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Self::Api { status, .. } if status == "invalid-token")
            || matches!(self, Self::Http { status: 401, .. })
    }

    /// Whether the call was aborted by its budget.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Endpoint identifier the error relates to, when known.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Http { endpoint, .. }
            | Self::Api { endpoint, .. }
            | Self::Timeout { endpoint, .. }
            | Self::Cancelled { endpoint, .. }
            | Self::Transport { endpoint, .. }
            | Self::Decode { endpoint, .. } => Some(endpoint),
            Self::NotFound { id, .. } => Some(id),
            Self::Configuration { .. } => None,
        }
    }
}

/// Convenience alias for dispatcher results.
pub type ApiResult<T> = Result<T, ApiError>;
