//! Coupon application coordinator
//!
//! Both the cart drawer and the checkout page submit coupons. The
//! coordinator keeps at most one live attempt per normalized code across
//! both surfaces, short-circuits codes that are already applied, classifies
//! the storefront's answer and turns it into toasts, callbacks and follow-up
//! refreshes.

pub(crate) mod attempts;
pub(crate) mod classify;
pub(crate) mod coordinator;
pub(crate) mod error;
pub(crate) mod types;

pub mod api;

#[cfg(test)]
mod tests;
