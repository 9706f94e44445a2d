//! Error taxonomy for calls against the platform API
//!
//! Facades never catch these; they bubble up to the command that issued the
//! call, which decides what to show the user.

use std::collections::BTreeMap;

use crate::api::BearerTokenError;
use crate::storage::StorageError;

/// Field order used when picking a single message to show inline.
const MESSAGE_PRIORITY: &[&str] = &[
    "username",
    "email",
    "password",
    "non_field_errors",
    "error",
    "detail",
];

/// Errors produced by the API client and the service facades.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connect failure, timeout, broken body).
    #[error("network failure: {0}")]
    Network(String),

    /// HTTP 401 that the refresh policy could not recover from.
    #[error("not authenticated{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Unauthorized { message: Option<String> },

    /// 4xx carrying per-field error messages.
    #[error("request rejected (HTTP {status}): {errors}")]
    Validation { status: u16, errors: FieldErrors },

    /// Any other non-success status below 500.
    #[error("HTTP {status}: {message}")]
    Client { status: u16, message: String },

    /// 5xx from the backend.
    #[error("server error (HTTP {status})")]
    Server { status: u16, body: String },

    /// The body of a successful response did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid stored token: {0}")]
    InvalidToken(#[from] BearerTokenError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Classify a non-success HTTP response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();

        if status == 401 {
            let message = parsed
                .as_ref()
                .and_then(|v| v.get("detail").or_else(|| v.get("error")))
                .and_then(|v| v.as_str())
                .map(str::to_string);
            return ApiError::Unauthorized { message };
        }

        if status >= 500 {
            return ApiError::Server {
                status,
                body: body.to_string(),
            };
        }

        if (400..500).contains(&status) {
            if let Some(errors) = parsed.as_ref().and_then(FieldErrors::from_json) {
                if errors.has_field_errors() {
                    return ApiError::Validation { status, errors };
                }
                if let Some(message) = errors.first_message() {
                    return ApiError::Client {
                        status,
                        message: message.to_string(),
                    };
                }
            }
        }

        let message = match body.trim() {
            "" => "request failed".to_string(),
            trimmed => trimmed.to_string(),
        };
        ApiError::Client { status, message }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Validation { status, .. }
            | ApiError::Client { status, .. }
            | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Single line suitable for an inline alert.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation { errors, .. } => errors
                .first_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            ApiError::Client { message, .. } => message.clone(),
            ApiError::Unauthorized {
                message: Some(message),
            } => message.clone(),
            ApiError::Network(_) => format!("{fallback} (backend unreachable)"),
            _ => fallback.to_string(),
        }
    }
}

/// Per-field error messages as returned by the backend's validators.
///
/// Nested objects are flattened with dotted keys (`profile.bio`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut errors = BTreeMap::new();
        for (key, value) in object {
            collect_messages(key, value, &mut errors);
        }
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// True when at least one key names an actual field rather than a
    /// generic `detail`/`error` message.
    pub fn has_field_errors(&self) -> bool {
        self.0.keys().any(|k| k != "detail" && k != "error")
    }

    /// First message following the display priority, then any field.
    pub fn first_message(&self) -> Option<&str> {
        MESSAGE_PRIORITY
            .iter()
            .find_map(|field| self.0.get(*field).and_then(|m| m.first()))
            .or_else(|| self.0.values().find_map(|m| m.first()))
            .map(String::as_str)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn collect_messages(
    key: &str,
    value: &serde_json::Value,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    match value {
        serde_json::Value::String(s) => out.entry(key.to_string()).or_default().push(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            if !messages.is_empty() {
                out.entry(key.to_string()).or_default().extend(messages);
            }
        }
        serde_json::Value::Object(nested) => {
            for (inner, value) in nested {
                collect_messages(&format!("{key}.{inner}"), value, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_keeps_detail() {
        let err = ApiError::from_response(401, r#"{"detail":"Token is invalid or expired"}"#);
        match err {
            ApiError::Unauthorized { message } => {
                assert_eq!(message.as_deref(), Some("Token is invalid or expired"))
            }
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn test_field_errors_become_validation() {
        let body = r#"{"username":["A user with that username already exists."],"password":["Too short."]}"#;
        let err = ApiError::from_response(400, body);
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.user_message("Failed to register"),
            "A user with that username already exists."
        );
    }

    #[test]
    fn test_detail_only_is_client_error() {
        let err = ApiError::from_response(404, r#"{"detail":"Not found."}"#);
        match err {
            ApiError::Client { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not found.");
            }
            other => panic!("expected Client, got {other:?}"),
        }
    }

    #[test]
    fn test_login_error_message() {
        let err = ApiError::from_response(400, r#"{"error":"Invalid credentials"}"#);
        assert_eq!(err.user_message("Failed to log in"), "Invalid credentials");
    }

    #[test]
    fn test_server_error_and_plain_body() {
        assert!(matches!(
            ApiError::from_response(502, "<html>bad gateway</html>"),
            ApiError::Server { status: 502, .. }
        ));
        match ApiError::from_response(418, "") {
            ApiError::Client { message, .. } => assert_eq!(message, "request failed"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_nested_profile_errors_are_flattened() {
        let value = serde_json::json!({"profile": {"github_url": ["Enter a valid URL."]}});
        let errors = FieldErrors::from_json(&value).unwrap();
        assert_eq!(
            errors.get("profile.github_url"),
            Some(&["Enter a valid URL.".to_string()][..])
        );
        assert_eq!(errors.first_message(), Some("Enter a valid URL."));
    }
}
