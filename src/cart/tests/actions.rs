//! Cart actions against a scripted storefront

use crate::cart::actions::{CartActions, CartOutcome};
use crate::cart::error::CartError;
use crate::cart::fragments::FragmentStore;
use crate::core::settings::{RefreshSettings, ToastSettings};
use crate::refresh::api::{
    OperationExecutor, OperationKind, QueuedOperation, RefreshQueue, RefreshResult,
};
use crate::remote::api::{CartResponse, Fragments, RemoteError};
use crate::remote::testing::FakeRemote;
use crate::toast::api::{Position, Severity, ToastNotifier};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

struct NoopExecutor;

#[async_trait]
impl OperationExecutor for NoopExecutor {
    async fn execute(&self, _operation: &QueuedOperation) -> RefreshResult<()> {
        Ok(())
    }
}

struct Fixture {
    remote: Arc<FakeRemote>,
    queue: RefreshQueue,
    toasts: ToastNotifier,
    actions: Arc<CartActions>,
}

fn fixture() -> Fixture {
    let remote = Arc::new(FakeRemote::new());
    let queue = RefreshQueue::new(RefreshSettings::default(), Arc::new(NoopExecutor));
    let toasts = ToastNotifier::new(ToastSettings::default(), None);
    let actions = Arc::new(
        CartActions::new(remote.clone(), queue.clone(), Arc::new(FragmentStore::new()))
            .with_toasts(toasts.clone()),
    );
    Fixture {
        remote,
        queue,
        toasts,
        actions,
    }
}

fn pending(queue: &RefreshQueue) -> Vec<(OperationKind, Option<String>)> {
    queue
        .pending()
        .unwrap()
        .into_iter()
        .map(|op| (op.name, op.payload))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_quantity_update_queues_refreshes() {
    let fixture = fixture();

    let outcome = fixture.actions.update_quantity("a1b2", 2).await.unwrap();

    assert_eq!(outcome, CartOutcome::Updated { cart_empty: false });
    assert_eq!(fixture.remote.calls(), vec!["update_quantity:a1b2:2".to_string()]);
    assert_eq!(
        pending(&fixture.queue),
        vec![
            (OperationKind::RefreshFragments, None),
            (OperationKind::UpdateCheckout, None)
        ]
    );
    assert!(fixture
        .actions
        .fragments()
        .get("span.cart-count")
        .unwrap()
        .is_some());
}

#[tokio::test(start_paused = true)]
async fn test_newer_quantity_update_aborts_older() {
    let fixture = fixture();
    fixture.remote.set_delay(Duration::from_millis(1000));

    let older = {
        let actions = fixture.actions.clone();
        tokio::spawn(async move { actions.update_quantity("a1b2", 2).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    fixture.remote.set_delay(Duration::ZERO);
    let newer = fixture.actions.update_quantity("a1b2", 3).await.unwrap();

    assert_eq!(newer, CartOutcome::Updated { cart_empty: false });
    assert_eq!(older.await.unwrap().unwrap(), CartOutcome::Superseded);
    assert_eq!(fixture.remote.count("update_quantity"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_updates_for_different_items_do_not_interfere() {
    let fixture = fixture();
    fixture.remote.set_delay(Duration::from_millis(100));

    let (first, second) = tokio::join!(
        fixture.actions.update_quantity("item-1", 2),
        fixture.actions.update_quantity("item-2", 5),
    );
    assert!(matches!(first.unwrap(), CartOutcome::Updated { .. }));
    assert!(matches!(second.unwrap(), CartOutcome::Updated { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_zero_quantity_removes_item() {
    let fixture = fixture();

    let outcome = fixture.actions.update_quantity("a1b2", 0).await.unwrap();

    assert_eq!(outcome, CartOutcome::Removed { cart_empty: false });
    assert_eq!(fixture.remote.calls(), vec!["remove_item:a1b2".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_remove_last_item_refreshes_fragments() {
    let fixture = fixture();
    fixture.remote.set_cart_response(Ok(CartResponse {
        success: true,
        fragments: Fragments::default(),
        cart_empty: true,
        message: None,
    }));

    let outcome = fixture.actions.remove_item("a1b2").await.unwrap();

    assert_eq!(outcome, CartOutcome::Removed { cart_empty: true });
    assert_eq!(
        pending(&fixture.queue),
        vec![
            (OperationKind::RefreshFragments, None),
            (OperationKind::UpdateCheckout, None),
            (OperationKind::RemovedFromCart, Some("a1b2".to_string())),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_remove_keeps_fragments_refresh_out_when_cart_not_empty() {
    let fixture = fixture();
    fixture.actions.remove_item("a1b2").await.unwrap();

    let kinds: Vec<OperationKind> = pending(&fixture.queue).into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        kinds,
        vec![OperationKind::UpdateCheckout, OperationKind::RemovedFromCart]
    );
}

#[tokio::test(start_paused = true)]
async fn test_rejected_update_shows_storefront_message() {
    let fixture = fixture();
    fixture.remote.set_cart_response(Ok(CartResponse {
        success: false,
        fragments: Fragments::default(),
        cart_empty: false,
        message: Some("<p>Only 2 left in stock.</p>".to_string()),
    }));

    let result = fixture.actions.update_quantity("a1b2", 5).await;

    assert!(matches!(result, Err(CartError::Rejected { .. })));
    let toasts = fixture.toasts.visible(Position::TopRight).unwrap();
    assert_eq!(toasts[0].text, "Only 2 left in stock.");
    assert_eq!(toasts[0].severity, Severity::Error);
    assert!(fixture.queue.pending().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rejection_notice_markup_is_escaped() {
    let fixture = fixture();
    fixture.remote.set_cart_response(Ok(CartResponse {
        success: false,
        fragments: Fragments::default(),
        cart_empty: false,
        message: Some("<p>Item &lt;script&gt; is unavailable.</p>".to_string()),
    }));

    let result = fixture.actions.remove_item("a1b2").await;

    assert!(matches!(result, Err(CartError::Rejected { .. })));
    let toasts = fixture.toasts.visible(Position::TopRight).unwrap();
    assert_eq!(toasts[0].text, "Item &lt;script&gt; is unavailable.");
}

#[tokio::test(start_paused = true)]
async fn test_network_failure_shows_generic_message() {
    let fixture = fixture();
    fixture.remote.set_cart_response(Err(RemoteError::Status {
        operation: "remove_cart_item".to_string(),
        status: 500,
    }));

    let result = fixture.actions.remove_item("a1b2").await;

    assert!(matches!(result, Err(CartError::Remote { .. })));
    let toasts = fixture.toasts.visible(Position::TopRight).unwrap();
    assert_eq!(toasts[0].text, "Could not update your cart, please try again.");
}

#[tokio::test(start_paused = true)]
async fn test_added_to_cart_queues_signal_and_refresh() {
    let fixture = fixture();
    fixture.actions.added_to_cart("42").unwrap();

    assert_eq!(
        pending(&fixture.queue),
        vec![
            (OperationKind::RefreshFragments, None),
            (OperationKind::AddedToCart, Some("42".to_string())),
        ]
    );
    assert!(fixture.remote.calls().is_empty());
}
