//! Toast notification surface
//!
//! One lazily created stack per screen position. Repeats of a visible
//! message bump its badge instead of stacking, overflow waits in a per-position
//! FIFO, and every toast carries a hover-pausable auto-dismiss timer.

pub(crate) mod error;
pub(crate) mod notifier;
pub(crate) mod timer;
pub(crate) mod types;

pub mod api;
