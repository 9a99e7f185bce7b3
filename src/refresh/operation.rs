//! Queued operation types

use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use tokio::time::Instant;

/// The storefront refresh operations, named after the signals they raise
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
    RefreshFragments,
    UpdateCheckout,
    AddedToCart,
    RemovedFromCart,
}

impl OperationKind {
    /// Lower runs first
    pub fn default_priority(self) -> i32 {
        match self {
            OperationKind::RefreshFragments => 1,
            OperationKind::UpdateCheckout => 2,
            OperationKind::AddedToCart | OperationKind::RemovedFromCart => 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnqueueOptions {
    /// Explicit priority; when absent a re-enqueue keeps the queued priority
    pub priority: Option<i32>,
    /// Data handed to the signal (product id, cart item key)
    pub payload: Option<String>,
}

impl EnqueueOptions {
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedOperation {
    pub name: OperationKind,
    pub priority: i32,
    pub enqueued_at: Instant,
    pub retry_count: u32,
    pub payload: Option<String>,
}

impl QueuedOperation {
    pub fn new(name: OperationKind, priority: i32, payload: Option<String>) -> Self {
        Self {
            name,
            priority,
            enqueued_at: Instant::now(),
            retry_count: 0,
            payload,
        }
    }
}
