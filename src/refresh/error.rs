//! Refresh queue error types

use crate::refresh::operation::OperationKind;
use crate::remote::api::RemoteError;

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Remote call for '{kind}' failed: {source}")]
    Remote {
        kind: OperationKind,
        #[source]
        source: RemoteError,
    },

    #[error("Operation '{kind}' failed: {message}")]
    Execution { kind: OperationKind, message: String },

    #[error("Refresh queue state unavailable: {message}")]
    State { message: String },
}

/// Refresh failures are background work and never reach the shopper
impl crate::core::error_handling::ContextualError for RefreshError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type RefreshResult<T> = Result<T, RefreshError>;
