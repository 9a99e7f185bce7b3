//! Public API for the refresh queue

pub use crate::refresh::error::{RefreshError, RefreshResult};
pub use crate::refresh::executor::{OperationExecutor, SignalExecutor};
pub use crate::refresh::guard::RecentFireGuard;
pub use crate::refresh::operation::{EnqueueOptions, OperationKind, QueuedOperation};
pub use crate::refresh::queue::RefreshQueue;
