//! Execution of queued operations

use crate::cart::api::FragmentStore;
use crate::notifications::api::{
    publish_or_log, CartEvent, CartSignal, Event, SharedNotificationManager,
};
use crate::refresh::error::{RefreshError, RefreshResult};
use crate::refresh::guard::RecentFireGuard;
use crate::refresh::operation::{OperationKind, QueuedOperation};
use crate::remote::api::RemoteCartService;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs one dequeued operation
///
/// An `Err` counts as a failed attempt and feeds the queue's retry logic.
#[async_trait]
pub trait OperationExecutor: Send + Sync {
    async fn execute(&self, operation: &QueuedOperation) -> RefreshResult<()>;
}

/// Default executor: turns operations into storefront signals
///
/// `refresh_fragments` fetches fresh markup first and publishes it with the
/// signal; the other kinds only raise their signal.
pub struct SignalExecutor {
    remote: Arc<dyn RemoteCartService>,
    fragments: Arc<FragmentStore>,
    notifications: SharedNotificationManager,
    guard: RecentFireGuard,
}

impl SignalExecutor {
    pub fn new(
        remote: Arc<dyn RemoteCartService>,
        fragments: Arc<FragmentStore>,
        notifications: SharedNotificationManager,
        guard: RecentFireGuard,
    ) -> Self {
        Self {
            remote,
            fragments,
            notifications,
            guard,
        }
    }

    async fn refresh_fragments(&self) -> RefreshResult<Option<CartSignal>> {
        let ticket = self.fragments.begin();
        let fragments = self
            .remote
            .refresh_fragments()
            .await
            .map_err(|source| RefreshError::Remote {
                kind: OperationKind::RefreshFragments,
                source,
            })?;

        let applied = self
            .fragments
            .apply(ticket, &fragments)
            .map_err(|e| RefreshError::Execution {
                kind: OperationKind::RefreshFragments,
                message: e.to_string(),
            })?;
        if !applied {
            return Ok(None);
        }

        Ok(Some(CartSignal::RefreshFragments {
            fragments: Arc::new(fragments),
        }))
    }
}

#[async_trait]
impl OperationExecutor for SignalExecutor {
    async fn execute(&self, operation: &QueuedOperation) -> RefreshResult<()> {
        if !self.guard.try_fire(operation.name)? {
            log::debug!(
                "Suppressed '{}': already fired within the guard window",
                operation.name
            );
            return Ok(());
        }

        let signal = match operation.name {
            OperationKind::RefreshFragments => match self.refresh_fragments().await? {
                Some(signal) => signal,
                None => return Ok(()),
            },
            OperationKind::UpdateCheckout => CartSignal::UpdateCheckout,
            OperationKind::AddedToCart => CartSignal::AddedToCart {
                product_id: operation.payload.clone(),
            },
            OperationKind::RemovedFromCart => CartSignal::RemovedFromCart {
                item_key: operation.payload.clone(),
            },
        };

        log::trace!("Raising '{}' signal", operation.name);
        publish_or_log(&self.notifications, Event::Cart(CartEvent::new(signal))).await;
        Ok(())
    }
}
