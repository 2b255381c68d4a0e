use thiserror::Error;

use crate::store::StoreError;
use crate::validation::ValidationError;

/// Failure below HTTP semantics: connection, timeout, body read, form assembly
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("failed to build multipart form: {0}")]
    Form(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_body() || error.is_decode() {
            TransportError::Body(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("session expired, sign in again")]
    SessionExpired,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Forbidden(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    /// Builds an `Http` error, preferring the server's `message` or `error`
    /// field over the raw body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["message", "error"]
                    .iter()
                    .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
            })
            .or_else(|| {
                let text = String::from_utf8_lossy(body).trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .unwrap_or_else(|| "<empty>".to_string());
        ApiError::Http { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_wins_over_raw_body() {
        let error =
            ApiError::from_response(400, br#"{"success":false,"message":"Title is required"}"#);
        assert_eq!(error.to_string(), "server returned 400: Title is required");
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn plain_and_empty_bodies_are_kept_readable() {
        let plain = ApiError::from_response(502, b" bad gateway ");
        assert_eq!(plain.to_string(), "server returned 502: bad gateway");

        let empty = ApiError::from_response(500, b"");
        assert_eq!(empty.to_string(), "server returned 500: <empty>");
    }
}
