//! Cart action error types

use crate::refresh::api::RefreshError;
use crate::remote::api::RemoteError;

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("{operation} failed: {source}")]
    Remote {
        operation: String,
        #[source]
        source: RemoteError,
    },

    /// The storefront answered but refused the change
    #[error("{message}")]
    Rejected { message: String },

    #[error("Failed to schedule refresh: {0}")]
    Refresh(#[from] RefreshError),

    #[error("Cart state unavailable: {message}")]
    State { message: String },
}

impl crate::core::error_handling::ContextualError for CartError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, CartError::Rejected { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            CartError::Rejected { message } => Some(message),
            _ => None,
        }
    }
}

pub type CartResult<T> = Result<T, CartError>;
