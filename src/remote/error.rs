//! Remote cart service error types

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    #[error("Network error during {operation}: {message}")]
    Network { operation: String, message: String },

    #[error("Request for {operation} timed out")]
    Timeout { operation: String },

    #[error("Request for {operation} was aborted")]
    Aborted { operation: String },

    #[error("Storefront answered {operation} with HTTP {status}")]
    Status { operation: String, status: u16 },

    #[error("Could not decode {operation} response: {message}")]
    Decode { operation: String, message: String },

    #[error("No storefront URL configured")]
    NotConfigured,
}

impl RemoteError {
    /// Failures worth retrying: the request may succeed if sent again
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Network { .. } | RemoteError::Timeout { .. } | RemoteError::Aborted { .. } => {
                true
            }
            RemoteError::Status { status, .. } => *status >= 500 || *status == 429,
            RemoteError::Decode { .. } | RemoteError::NotConfigured => false,
        }
    }
}

impl crate::core::error_handling::ContextualError for RemoteError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;
