//! Client-side coordination of WooCommerce cart refreshes, coupon
//! application and toast notifications
//!
//! [`core::services::CartServices`] builds and wires the services:
//!
//! - [`refresh`]: debounced, prioritised queue of storefront refresh signals
//! - [`coupon`]: one in-flight attempt per coupon code across page surfaces
//! - [`toast`]: stacked, deduplicating, auto-dismissing notifications
//! - [`cart`]: quantity changes and removals feeding the refresh queue
//!
//! Storefront traffic goes through the [`remote::api::RemoteCartService`]
//! trait and listeners receive typed events from [`notifications`].

pub mod app;
pub mod cart;
pub mod core;
pub mod coupon;
pub mod notifications;
pub mod refresh;
pub mod remote;
pub mod toast;
