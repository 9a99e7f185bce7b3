//! Synchronization utilities for robust mutex handling
//!
//! Service state (queued operations, coupon attempts, toast slots) lives behind
//! short-held `std::sync::Mutex` guards. A poisoned lock means a panic happened
//! while the state was being mutated; callers turn that into their own module
//! error instead of propagating the panic.

use std::sync::LockResult;

/// Handle poisoned mutex cases with consistent error handling
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use cartsync::core::sync::handle_mutex_poison;
/// use cartsync::refresh::api::RefreshError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(mutex.lock(), |msg| RefreshError::State { message: msg })
///     .unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). This indicates a panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}
