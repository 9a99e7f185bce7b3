//! Cart mutations and the client-side fragment copy
//!
//! Quantity updates supersede each other per cart item: starting a new one
//! aborts the request still in flight for the same item. Every response goes
//! through the [`FragmentStore`](api::FragmentStore) sequence guard before it
//! touches the stored markup.

pub(crate) mod actions;
pub(crate) mod error;
pub(crate) mod fragments;

pub mod api;

#[cfg(test)]
mod tests;
