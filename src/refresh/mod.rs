//! Refresh operation queue
//!
//! UI events enqueue named operations (`refresh_fragments`,
//! `update_checkout`, `added_to_cart`, `removed_from_cart`). The queue keeps
//! one entry per name, waits for a quiet period, then runs the entries in
//! priority order through an [`OperationExecutor`](api::OperationExecutor),
//! retrying failures a bounded number of times.
//!
//! ```text
//!  enqueue ──► [debounce] ──► sort by priority ──► execute ─┬─► pace ─► next
//!                                                          └─► retry (front)
//! ```

pub(crate) mod error;
pub(crate) mod executor;
pub(crate) mod guard;
pub(crate) mod operation;
pub(crate) mod queue;

pub mod api;

#[cfg(test)]
mod tests;
