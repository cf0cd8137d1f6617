//! API Error Types
//!
//! Errors raised while talking to the portal backend, plus the conversion
//! of those errors into user-facing messages.

use thiserror::Error;

/// API client error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Backend unreachable, connection reset, timeout
    #[error("Network error: {0}")]
    Transport(String),

    /// Backend answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Decode(String),

    /// Request body could not be serialized
    #[error("Request build error: {0}")]
    Encode(String),
}

impl ApiError {
    /// Build a status error from a raw response body
    ///
    /// Bodies that are a bare JSON string are unquoted; anything else is kept
    /// verbatim.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<String>(body)
            .unwrap_or_else(|_| body.trim().to_string());
        ApiError::Status { status, message }
    }

    /// HTTP status code, if the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message supplied by the backend, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// Text shown to the user: the raw server message, else `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::from_status(401, "Invalid credentials");
        assert_eq!(err.to_string(), "HTTP 401: Invalid credentials");

        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_json_string_body_is_unquoted() {
        let err = ApiError::from_status(409, "\"El correo ya ha sido registrado\"");
        assert_eq!(err.server_message(), Some("El correo ya ha sido registrado"));
        assert!(err.is_conflict());
    }

    #[test]
    fn test_user_message_fallback() {
        let err = ApiError::from_status(500, "");
        assert_eq!(err.user_message("Server error"), "Server error");

        let err = ApiError::Transport("timeout".to_string());
        assert_eq!(err.user_message("Server error"), "Server error");
        assert_eq!(err.status(), None);
    }
}
