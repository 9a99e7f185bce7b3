//! Quantity changes, removals and "added to cart" events

use crate::cart::error::{CartError, CartResult};
use crate::cart::fragments::FragmentStore;
use crate::core::error_handling::user_facing_message;
use crate::core::strings::{escape_text, notice_text};
use crate::core::sync::handle_mutex_poison;
use crate::refresh::api::{EnqueueOptions, OperationKind, RefreshQueue};
use crate::remote::api::{CartResponse, RemoteCartService, RemoteResult};
use crate::toast::api::{ToastNotifier, ToastOptions};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::AbortHandle;

const GENERIC_FAILURE: &str = "Could not update your cart, please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    Updated { cart_empty: bool },
    Removed { cart_empty: bool },
    /// A newer update for the same item replaced this one
    Superseded,
}

struct PendingUpdate {
    request: u64,
    abort: AbortHandle,
}

/// Cart mutations triggered from the mini-cart and cart page
pub struct CartActions {
    remote: Arc<dyn RemoteCartService>,
    queue: RefreshQueue,
    fragments: Arc<FragmentStore>,
    toasts: Option<ToastNotifier>,
    next_request: AtomicU64,
    pending: Mutex<HashMap<String, PendingUpdate>>,
}

impl CartActions {
    pub fn new(
        remote: Arc<dyn RemoteCartService>,
        queue: RefreshQueue,
        fragments: Arc<FragmentStore>,
    ) -> Self {
        Self {
            remote,
            queue,
            fragments,
            toasts: None,
            next_request: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_toasts(mut self, toasts: ToastNotifier) -> Self {
        self.toasts = Some(toasts);
        self
    }

    pub fn fragments(&self) -> &FragmentStore {
        &self.fragments
    }

    /// Change an item's quantity, aborting any older update for the same item
    ///
    /// A quantity of zero removes the item.
    pub async fn update_quantity(&self, item_key: &str, quantity: u32) -> CartResult<CartOutcome> {
        if quantity == 0 {
            return self.remove_item(item_key).await;
        }

        let ticket = self.fragments.begin();
        let request = self.next_request.fetch_add(1, Ordering::Relaxed);

        let remote = Arc::clone(&self.remote);
        let key = item_key.to_string();
        let handle = tokio::spawn(async move { remote.update_quantity(&key, quantity).await });
        self.track(item_key, request, handle.abort_handle())?;

        let joined = handle.await;
        self.untrack(item_key, request)?;

        let result = match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => {
                log::debug!(
                    "Quantity update #{} for '{}' superseded by a newer one",
                    request,
                    item_key
                );
                return Ok(CartOutcome::Superseded);
            }
            Err(e) => {
                return Err(CartError::State {
                    message: format!("quantity update task failed: {e}"),
                })
            }
        };

        let response = self.accept("Quantity update", result).await?;
        self.fragments.apply(ticket, &response.fragments)?;
        self.enqueue(OperationKind::RefreshFragments, EnqueueOptions::default())?;
        self.enqueue(OperationKind::UpdateCheckout, EnqueueOptions::default())?;
        Ok(CartOutcome::Updated {
            cart_empty: response.cart_empty,
        })
    }

    pub async fn remove_item(&self, item_key: &str) -> CartResult<CartOutcome> {
        self.abort_pending(item_key)?;
        let ticket = self.fragments.begin();

        let result = self.remote.remove_item(item_key).await;
        let response = self.accept("Item removal", result).await?;

        self.fragments.apply(ticket, &response.fragments)?;
        self.enqueue(
            OperationKind::RemovedFromCart,
            EnqueueOptions::default().payload(item_key),
        )?;
        self.enqueue(OperationKind::UpdateCheckout, EnqueueOptions::default())?;
        if response.cart_empty {
            self.enqueue(OperationKind::RefreshFragments, EnqueueOptions::default())?;
        }
        Ok(CartOutcome::Removed {
            cart_empty: response.cart_empty,
        })
    }

    /// A product was added to the cart elsewhere on the page
    pub fn added_to_cart(&self, product_id: &str) -> CartResult<()> {
        self.enqueue(
            OperationKind::AddedToCart,
            EnqueueOptions::default().payload(product_id),
        )?;
        self.enqueue(OperationKind::RefreshFragments, EnqueueOptions::default())
    }

    fn enqueue(&self, kind: OperationKind, options: EnqueueOptions) -> CartResult<()> {
        self.queue.enqueue(kind, options)?;
        Ok(())
    }

    /// Turn a remote result into a successful response, toasting failures
    async fn accept(
        &self,
        operation: &str,
        result: RemoteResult<CartResponse>,
    ) -> CartResult<CartResponse> {
        let error = match result {
            Ok(response) if response.success => return Ok(response),
            Ok(response) => CartError::Rejected {
                message: response
                    .message
                    .as_deref()
                    .map(notice_text)
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            },
            Err(source) => CartError::Remote {
                operation: operation.to_string(),
                source,
            },
        };

        log::warn!("{}", error);
        if let Some(toasts) = &self.toasts {
            let text = escape_text(user_facing_message(&error, GENERIC_FAILURE));
            if let Err(e) = toasts.error(&text, ToastOptions::default()).await {
                log::warn!("Failed to show cart toast: {}", e);
            }
        }
        Err(error)
    }

    fn track(&self, item_key: &str, request: u64, abort: AbortHandle) -> CartResult<()> {
        let mut pending = handle_mutex_poison(self.pending.lock(), |message| {
            CartError::State { message }
        })?;
        if let Some(previous) = pending.insert(item_key.to_string(), PendingUpdate { request, abort })
        {
            previous.abort.abort();
        }
        Ok(())
    }

    fn untrack(&self, item_key: &str, request: u64) -> CartResult<()> {
        let mut pending = handle_mutex_poison(self.pending.lock(), |message| {
            CartError::State { message }
        })?;
        if pending.get(item_key).is_some_and(|p| p.request == request) {
            pending.remove(item_key);
        }
        Ok(())
    }

    fn abort_pending(&self, item_key: &str) -> CartResult<()> {
        let mut pending = handle_mutex_poison(self.pending.lock(), |message| {
            CartError::State { message }
        })?;
        if let Some(previous) = pending.remove(item_key) {
            log::debug!("Aborting quantity update for removed item '{}'", item_key);
            previous.abort.abort();
        }
        Ok(())
    }
}
