//! HTTP client for the inventory and dictionary webhooks.
//!
//! Every call is a single JSON `POST` bounded by an explicit timeout. There
//! is no retry; a failed call is reported once and must be re-triggered by
//! the caller. Non-2xx responses are turned into a human-readable
//! [`WebhookError::Upstream`] message.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;

use crate::error::WebhookError;

/// Message the upstream workflow returns when a delete matches no row.
const NOT_FOUND_SENTINEL: &str = "No item to return was found";

/// Replacement for [`NOT_FOUND_SENTINEL`] shown to operators.
pub const NOT_FOUND_MESSAGE: &str = "item not found or already deleted";

/// Longest raw (non-JSON) error body surfaced verbatim.
const MAX_RAW_MESSAGE_LEN: usize = 300;

/// Shared client for all outbound webhook calls.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    timeout: Duration,
}

impl WebhookClient {
    /// Creates a client whose calls are abandoned after `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, WebhookError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .connect_timeout(timeout)
            .user_agent("stockmap/0.1 (inventory-admin)")
            .build()?;

        Ok(Self { client, timeout })
    }

    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }

    /// POSTs `body` as JSON to `url` and returns the response body.
    ///
    /// An empty 2xx body is returned as [`Value::Null`] and a non-JSON 2xx
    /// body as [`Value::String`]. A 2xx JSON body carrying
    /// `"success": false` is treated as an upstream failure.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::Timeout`] when no response arrives in time.
    /// - [`WebhookError::Http`] on network failure.
    /// - [`WebhookError::Upstream`] on a non-2xx status or a business failure.
    pub async fn post_json<T>(&self, url: &Url, body: &T) -> Result<Value, WebhookError>
    where
        T: Serialize + ?Sized,
    {
        let call = async {
            let response = self
                .client
                .post(url.clone())
                .json(body)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;
            let status = response.status();
            let text = response.text().await.map_err(|e| self.transport_error(e))?;
            Ok::<_, WebhookError>((status, text))
        };

        let (status, text) = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| WebhookError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        if !status.is_success() {
            let message = upstream_message(status.as_u16(), &text);
            tracing::warn!(url = %url, status = status.as_u16(), %message, "webhook returned an error status");
            return Err(WebhookError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body = success_body(&text);
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = message_from_json(&body).map_or_else(
                || "webhook reported failure".to_string(),
                |m| translate_sentinel(&m),
            );
            return Err(WebhookError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    /// Timeouts raised inside `reqwest` (connect or read) count the same as
    /// the outer deadline.
    fn transport_error(&self, error: reqwest::Error) -> WebhookError {
        if error.is_timeout() {
            WebhookError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            WebhookError::Http(error)
        }
    }
}

/// URLs of the two dictionary webhooks. Either may be unconfigured.
#[derive(Debug, Clone, Default)]
pub struct DictionaryEndpoints {
    pub product: Option<Url>,
    pub combo: Option<Url>,
}

impl DictionaryEndpoints {
    /// # Errors
    ///
    /// Returns [`WebhookError::InvalidUrl`] if a configured URL is malformed.
    pub fn from_config(product: Option<&str>, combo: Option<&str>) -> Result<Self, WebhookError> {
        Ok(Self {
            product: product.map(parse_url).transpose()?,
            combo: combo.map(parse_url).transpose()?,
        })
    }
}

/// Parses a webhook URL, accepting only `http` and `https`.
///
/// # Errors
///
/// Returns [`WebhookError::InvalidUrl`] when `raw` is not an absolute
/// http(s) URL.
pub fn parse_url(raw: &str) -> Result<Url, WebhookError> {
    let url = Url::parse(raw.trim()).map_err(|e| WebhookError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(WebhookError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn success_body(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

/// Best human-readable message for a non-2xx response.
fn upstream_message(status: u16, body: &str) -> String {
    let extracted = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| message_from_json(&json))
        .or_else(|| {
            let raw = body.trim();
            (!raw.is_empty() && raw.len() <= MAX_RAW_MESSAGE_LEN && !raw.starts_with('<'))
                .then(|| raw.to_string())
        });

    match extracted {
        Some(message) => translate_sentinel(&message),
        None => format!("webhook returned status {status}"),
    }
}

/// Pulls `message` or `error` (string or `{ message }`) out of a JSON body.
/// Arrays are searched through their first element.
fn message_from_json(json: &Value) -> Option<String> {
    if let Value::Array(items) = json {
        return items.first().and_then(message_from_json);
    }
    for key in ["message", "error"] {
        match json.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(nested @ Value::Object(_)) => {
                if let Some(s) = nested.get("message").and_then(Value::as_str) {
                    return Some(s.trim().to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn translate_sentinel(message: &str) -> String {
    if message.contains(NOT_FOUND_SENTINEL) {
        NOT_FOUND_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}
