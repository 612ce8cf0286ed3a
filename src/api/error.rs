use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::auth::RefreshError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Access token expired and could not be renewed. The embedding UI should
    /// navigate back to the login view; the token store has already been
    /// cleared unless the failure was transport-level.
    #[error("session expired: {0}")]
    SessionExpired(#[from] RefreshError),

    /// 401 that persisted after a successful renewal, or 401 from an endpoint
    /// that establishes sessions rather than consuming them (bad login).
    #[error("unauthorized: {0}")]
    Unauthorized(ErrorDetail),

    #[error("permission denied: {0}")]
    Forbidden(ErrorDetail),

    #[error("not found: {0}")]
    NotFound(ErrorDetail),

    /// 400 with the server's validation messages, field-keyed or `detail`.
    #[error("validation failed: {0}")]
    BadRequest(ErrorDetail),

    #[error("server error: {0}")]
    Server(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 => ApiError::BadRequest(ErrorDetail::parse(body)),
            401 => ApiError::Unauthorized(ErrorDetail::parse(body)),
            403 => ApiError::Forbidden(ErrorDetail::parse(body)),
            404 => ApiError::NotFound(ErrorDetail::parse(body)),
            500..=599 => ApiError::Server(truncate_body(body)),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncate_body(body))),
        }
    }
}

/// Truncate a response body to avoid carrying excessive data in errors
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    // Back off to a char boundary; non-ASCII bodies (localized proxy error
    // pages) must not split a multi-byte character.
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}... (truncated, {} total bytes)",
        &body[..end],
        body.len()
    )
}

/// Parsed server error body. The platform returns either a human-readable
/// `{"detail": ..., "code": ...}` pair or field-keyed validation messages
/// like `{"email": ["A user with this email already exists."]}`.
#[derive(Debug, Default, Clone)]
pub struct ErrorDetail {
    pub detail: Option<String>,
    pub code: Option<String>,
    pub fields: BTreeMap<String, Vec<String>>,
    /// Raw body kept for diagnostics when neither shape matched
    pub raw: Option<String>,
}

impl ErrorDetail {
    pub fn parse(body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
            return Self {
                raw: Some(truncate_body(body)),
                ..Self::default()
            };
        };

        let Some(map) = value.as_object() else {
            return Self {
                raw: Some(truncate_body(body)),
                ..Self::default()
            };
        };

        let mut parsed = Self::default();
        for (key, value) in map {
            match (key.as_str(), value) {
                ("detail", serde_json::Value::String(s)) => parsed.detail = Some(s.clone()),
                ("code", serde_json::Value::String(s)) => parsed.code = Some(s.clone()),
                (field, serde_json::Value::Array(items)) => {
                    let messages: Vec<String> = items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect();
                    if !messages.is_empty() {
                        parsed.fields.insert(field.to_string(), messages);
                    }
                }
                (field, serde_json::Value::String(s)) => {
                    parsed.fields.insert(field.to_string(), vec![s.clone()]);
                }
                _ => {}
            }
        }

        if parsed.detail.is_none() && parsed.fields.is_empty() {
            parsed.raw = Some(truncate_body(body));
        }
        parsed
    }

    /// One human-readable line for the UI layer to show.
    pub fn message(&self) -> String {
        if let Some(ref detail) = self.detail {
            return detail.clone();
        }
        if !self.fields.is_empty() {
            return self
                .fields
                .iter()
                .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
                .collect::<Vec<_>>()
                .join("; ");
        }
        self.raw.clone().unwrap_or_else(|| "unknown error".into())
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
