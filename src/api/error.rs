use serde::Deserialize;
use thiserror::Error;

/// Fixed message for auth responses that come back 2xx but are missing
/// `user` or `token`.
pub const INVALID_RESPONSE_MSG: &str = "Invalid response structure from server";

const GENERIC_FAILURE_MSG: &str = "An error occurred";

/// Failure surfaced by the API client. Callers switch on the variant
/// (notably `Unauthorized`) instead of parsing message text.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{reason}")]
    InvalidResponse { reason: String },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn invalid_response() -> Self {
        ApiError::InvalidResponse {
            reason: INVALID_RESPONSE_MSG.to_string(),
        }
    }

    /// Classify a non-2xx response from its status and raw body. The body
    /// is expected to be JSON with an optional `message` field; anything
    /// else falls back to a generic message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        if status == 401 {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Server { status, message }
        }
    }

    /// The human-readable string views render inline.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized { message } | ApiError::Server { message, .. } => {
                message.clone()
            }
            ApiError::Transport(_) => GENERIC_FAILURE_MSG.to_string(),
            ApiError::InvalidResponse { reason } => reason.clone(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn extract_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| GENERIC_FAILURE_MSG.to_string())
}
