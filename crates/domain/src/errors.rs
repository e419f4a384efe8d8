//! Error types used throughout the SDK

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Main error type for the data.stack SDK
///
/// Every public async operation either resolves with a typed result or fails
/// with one of these kinds.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum DataStackError {
    /// Login, token check, refresh or logout failed, or no token is held.
    #[error("Authentication error: {message}")]
    Auth {
        status_code: Option<u16>,
        body: Option<Value>,
        message: String,
    },

    /// A resource call returned non-2xx or the network layer failed.
    #[error("Transport error: {message}")]
    Transport {
        status_code: Option<u16>,
        body: Option<Value>,
        message: String,
    },

    /// Programmer misuse detected before any network call.
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataStackError {
    /// Authentication failure without an HTTP response.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth { status_code: None, body: None, message: message.into() }
    }

    /// Transport failure without an HTTP response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { status_code: None, body: None, message: message.into() }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// HTTP status code carried by the error, if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Auth { status_code, .. } | Self::Transport { status_code, .. } => *status_code,
            Self::Usage(_) | Self::Config(_) => None,
        }
    }

    /// Raw response body carried by the error, if any.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Auth { body, .. } | Self::Transport { body, .. } => body.as_ref(),
            Self::Usage(_) | Self::Config(_) => None,
        }
    }

    /// `true` when the server answered 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// Re-tag a transport failure as an authentication failure.
    ///
    /// Used on the rbac endpoints where any failure is an auth failure.
    #[must_use]
    pub fn into_auth(self) -> Self {
        match self {
            Self::Transport { status_code, body, message } => {
                Self::Auth { status_code, body, message }
            }
            other => other,
        }
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, DataStackError>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_code_accessors() {
        let err = DataStackError::Transport {
            status_code: Some(404),
            body: Some(json!({"message": "not found"})),
            message: "GET /x returned 404".into(),
        };
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.body(), Some(&json!({"message": "not found"})));
        assert!(!err.is_unauthorized());

        assert_eq!(DataStackError::usage("bad").status_code(), None);
    }

    #[test]
    fn test_into_auth_keeps_response_details() {
        let err = DataStackError::Transport {
            status_code: Some(401),
            body: None,
            message: "unauthorized".into(),
        }
        .into_auth();

        assert!(matches!(err, DataStackError::Auth { status_code: Some(401), .. }));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            DataStackError::usage("select a field first").to_string(),
            "Usage error: select a field first"
        );
        assert_eq!(DataStackError::auth("no token").to_string(), "Authentication error: no token");
    }

    #[test]
    fn test_serializes_every_variant() {
        let usage = serde_json::to_value(DataStackError::usage("select a field first")).unwrap();
        assert_eq!(usage, json!({"type": "usage", "detail": "select a field first"}));

        let auth = DataStackError::Auth {
            status_code: Some(401),
            body: Some(json!({"message": "expired"})),
            message: "rejected".into(),
        };
        let value = serde_json::to_value(&auth).unwrap();
        assert_eq!(value["type"], json!("auth"));
        assert_eq!(value["detail"]["status_code"], json!(401));
        assert_eq!(serde_json::from_value::<DataStackError>(value).unwrap(), auth);
    }
}
