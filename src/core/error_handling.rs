//! Generic error handling utilities
//!
//! Every module error in the crate can tell whether its message is meant for
//! the shopper (a rejected coupon, a bad config value the operator can fix)
//! or is a system condition (a dropped connection, a poisoned lock) that only
//! belongs in the debug log.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`. When it returns `false`, `user_message()` returns `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message that should be shown as-is
    ///
    /// Examples of user-actionable errors:
    /// - A coupon rejected by the storefront ("Coupon has expired")
    /// - Configuration values outside their valid range
    ///
    /// Examples of system errors:
    /// - Network timeouts
    /// - Closed event channels
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// User-actionable errors log their own message; system errors log the
/// operation context. Full detail always goes to the debug level.
///
/// # Examples
/// ```rust,no_run
/// # use cartsync::core::error_handling::log_error_with_context;
/// # use cartsync::core::settings::ConfigError;
/// let err = ConfigError::Invalid {
///     field: "toast.max_visible".to_string(),
///     message: "must be greater than 0".to_string(),
/// };
/// log_error_with_context(&err, "Loading configuration");
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("FATAL: {}", user_msg);
        }
        _ => {
            log::error!("FATAL: {}", operation_context);
        }
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Pick the text a shopper should see for an error
///
/// Falls back to `generic` for system errors so internal details never reach
/// a toast.
pub fn user_facing_message<'a, E: ContextualError>(error: &'a E, generic: &'a str) -> &'a str {
    if error.is_user_actionable() {
        error.user_message().unwrap_or(generic)
    } else {
        generic
    }
}
