//! Typed signal bus
//!
//! Storefront signals (`refresh_fragments`, `update_checkout`, ...) together
//! with coupon and toast lifecycle events are published here. Listeners
//! subscribe with an [`EventFilter`](api::EventFilter) and receive events on
//! their own unbounded channel, so a slow listener never blocks the services
//! raising the events.

// Internal modules - all access should go through api module
pub(crate) mod error;
pub(crate) mod event;
pub(crate) mod manager;
pub(crate) mod traits;

// Public API module - the only public interface for the notification system
pub mod api;
