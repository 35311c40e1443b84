/// Failure of a single call through the API gateway.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized: {}", .message.as_deref().unwrap_or("session expired"))]
    Unauthorized { message: Option<String> },

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Status { status: u16, message: Option<String> },

    #[error("network: {0}")]
    Network(String),

    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds the error for a non-2xx response, pulling `message` (or
    /// `error`) out of a JSON body when there is one.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = server_message(body);
        if status == 401 {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Status { status, message }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Text to show the user for a failed mutation. `None` for a 401: the
    /// session-expiry redirect is the only signal the user gets.
    pub fn user_notice<'a>(&'a self, fallback: &'a str) -> Option<&'a str> {
        if self.is_unauthorized() {
            return None;
        }
        Some(self.server_message().unwrap_or(fallback))
    }
}

fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
        .filter(|m| !m.trim().is_empty())
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage write failed: {0}")]
    Write(String),

    #[error("encode: {0}")]
    Encode(String),
}

pub const UNREACHABLE_MESSAGE: &str =
    "Cannot connect to server. Please ensure the backend is running.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Sign-in failures, worded for display on the login form.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LoginError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{}", UNREACHABLE_MESSAGE)]
    Unreachable,

    #[error("could not save session: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Unexpected(String),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(_) => LoginError::Unreachable,
            ApiError::Unauthorized { message } => LoginError::InvalidCredentials(
                message.unwrap_or_else(|| INVALID_CREDENTIALS_MESSAGE.into()),
            ),
            ApiError::Status { status, message } if (400..500).contains(&status) => {
                LoginError::InvalidCredentials(
                    message.unwrap_or_else(|| INVALID_CREDENTIALS_MESSAGE.into()),
                )
            }
            other => LoginError::Unexpected(
                other
                    .server_message()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| other.to_string()),
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RegisterError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Login(#[from] LoginError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_reads_message_then_error() {
        let err = ApiError::from_status(400, r#"{"message":"Email already used"}"#);
        assert_eq!(err.server_message(), Some("Email already used"));

        let err = ApiError::from_status(409, r#"{"error":"Conflict"}"#);
        assert_eq!(err.server_message(), Some("Conflict"));
        assert_eq!(err.status(), Some(409));

        let err = ApiError::from_status(500, "<html>oops</html>");
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn status_401_is_unauthorized() {
        assert!(ApiError::from_status(401, "").is_unauthorized());
        assert!(!ApiError::from_status(403, "").is_unauthorized());
    }

    #[test]
    fn expired_session_has_no_user_notice() {
        let expired = ApiError::from_status(401, r#"{"message":"Token expired"}"#);
        assert_eq!(expired.user_notice("Failed to update status."), None);

        let rejected = ApiError::from_status(400, r#"{"message":"Task already done"}"#);
        assert_eq!(rejected.user_notice("Failed to update status."), Some("Task already done"));

        let down = ApiError::Network("connection refused".into());
        assert_eq!(down.user_notice("Failed to update status."), Some("Failed to update status."));
    }

    #[test]
    fn login_error_distinguishes_network_from_credentials() {
        let unreachable = LoginError::from(ApiError::Network("connection refused".into()));
        assert_eq!(unreachable, LoginError::Unreachable);
        assert_eq!(unreachable.to_string(), UNREACHABLE_MESSAGE);

        let bad = LoginError::from(ApiError::from_status(401, ""));
        assert_eq!(bad.to_string(), INVALID_CREDENTIALS_MESSAGE);

        let bad = LoginError::from(ApiError::from_status(400, r#"{"message":"Wrong password"}"#));
        assert_eq!(bad.to_string(), "Wrong password");
    }
}
