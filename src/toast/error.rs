//! Toast error types

#[derive(Debug, Clone, thiserror::Error)]
pub enum ToastError {
    #[error("Toast message is empty")]
    EmptyMessage,

    #[error("Toast state unavailable: {message}")]
    State { message: String },
}

impl crate::core::error_handling::ContextualError for ToastError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

pub type ToastResult<T> = Result<T, ToastError>;
