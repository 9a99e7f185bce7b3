//! Public API for toast notifications

pub use crate::toast::error::{ToastError, ToastResult};
pub use crate::toast::notifier::ToastNotifier;
pub use crate::toast::types::{Position, Severity, ToastId, ToastOptions, ToastSnapshot};
