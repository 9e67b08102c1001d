//! SAST API Error Types

/// Errors raised while talking to the SAST REST API
#[derive(Debug, Clone, thiserror::Error)]
pub enum SastError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{operation} returned HTTP {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Could not decode {operation} response: {message}")]
    Decode { operation: String, message: String },

    #[error("No valid SAST credential available")]
    Unauthenticated,

    #[error("Invalid {kind} record {id}: {reason}")]
    InvalidRecord {
        kind: &'static str,
        id: i64,
        reason: String,
    },

    #[error("Invalid SAST client configuration: {message}")]
    Configuration { message: String },
}

const REJECTED_CREDENTIALS: &str =
    "SAST rejected the configured credentials (check username and password)";

impl crate::core::error_handling::ContextualError for SastError {
    fn is_user_actionable(&self) -> bool {
        match self {
            SastError::Unauthenticated | SastError::Configuration { .. } => true,
            SastError::Status { status, .. } => matches!(status, 400 | 401 | 403),
            SastError::Transport { .. }
            | SastError::Decode { .. }
            | SastError::InvalidRecord { .. } => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            SastError::Configuration { message } => Some(message),
            _ if self.is_user_actionable() => Some(REJECTED_CREDENTIALS),
            _ => None,
        }
    }
}

/// Result type for SAST API operations
pub type SastResult<T> = Result<T, SastError>;
