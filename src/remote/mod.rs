//! Remote cart service boundary
//!
//! The coordinator services only see the [`RemoteCartService`](api::RemoteCartService)
//! trait. [`WooAjaxClient`](api::WooAjaxClient) implements it against a live
//! WooCommerce storefront.

pub(crate) mod error;
pub(crate) mod http;
pub(crate) mod traits;
pub(crate) mod types;

pub mod api;

#[cfg(test)]
pub(crate) mod testing;
