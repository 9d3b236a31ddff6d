use thiserror::Error;

/// Failures of an outbound webhook call.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No response within the configured window; the call was abandoned.
    #[error("webhook did not respond within {secs}s")]
    Timeout { secs: u64 },

    /// The webhook answered with a non-2xx status, or a 2xx body carrying
    /// `"success": false`.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("invalid webhook URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl WebhookError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, WebhookError::Timeout { .. })
    }
}

/// A proxied request body that fails validation before any network call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {field} must be a whole number, got {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field {field} must not be negative")]
    Negative { field: &'static str },

    #[error("unknown tipo_operacion: {0}")]
    UnknownOperation(String),
}
