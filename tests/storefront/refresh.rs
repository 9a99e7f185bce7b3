//! Refresh queue behaviour seen from the signal bus

use crate::common::{cart_listener, services, signal_kinds, ScriptedStorefront};
use cartsync::core::services::CartServices;
use cartsync::core::settings::Settings;
use cartsync::refresh::api::{EnqueueOptions, OperationKind};

#[tokio::test(start_paused = true)]
async fn test_duplicate_refresh_runs_once_before_added_to_cart() {
    let storefront = ScriptedStorefront::new();
    let services = services(&storefront);
    let mut listener = cart_listener(&services).await;
    let queue = services.refresh_queue();

    queue
        .enqueue(OperationKind::RefreshFragments, EnqueueOptions::default().priority(1))
        .unwrap();
    queue
        .enqueue(OperationKind::AddedToCart, EnqueueOptions::default().priority(3))
        .unwrap();
    queue
        .enqueue(OperationKind::RefreshFragments, EnqueueOptions::default().priority(1))
        .unwrap();
    assert_eq!(queue.pending().unwrap().len(), 2);

    services.settled().await.unwrap();

    assert_eq!(
        signal_kinds(&mut listener),
        vec![OperationKind::RefreshFragments, OperationKind::AddedToCart]
    );
    assert_eq!(storefront.count("refresh_fragments"), 1);
    assert_eq!(
        services
            .fragments()
            .get("div.widget_shopping_cart_content")
            .unwrap()
            .as_deref(),
        Some("<div class=\"widget_shopping_cart_content\"><ul></ul></div>")
    );
}

#[tokio::test(start_paused = true)]
async fn test_failing_refresh_is_bounded_and_silent() {
    let storefront = ScriptedStorefront::new();
    storefront.take_fragments_down();
    let services = services(&storefront);
    let mut listener = cart_listener(&services).await;

    services
        .refresh_queue()
        .enqueue(OperationKind::RefreshFragments, EnqueueOptions::default())
        .unwrap();
    services.settled().await.unwrap();

    let max_retries = services.settings().refresh.max_retries as usize;
    assert_eq!(storefront.count("refresh_fragments"), max_retries + 1);
    assert!(signal_kinds(&mut listener).is_empty());
    assert!(services
        .toasts()
        .visible(services.settings().toast.position)
        .unwrap()
        .is_empty());
    assert!(!services.refresh_queue().is_currently_refreshing().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_force_refresh_bypasses_debounce() {
    let storefront = ScriptedStorefront::new();
    let services = services(&storefront);
    let mut listener = cart_listener(&services).await;
    let queue = services.refresh_queue();

    queue
        .enqueue(OperationKind::UpdateCheckout, EnqueueOptions::default())
        .unwrap();
    queue
        .enqueue(OperationKind::RefreshFragments, EnqueueOptions::default())
        .unwrap();
    queue
        .force_refresh(&[OperationKind::UpdateCheckout, OperationKind::RefreshFragments])
        .await
        .unwrap();

    assert_eq!(
        signal_kinds(&mut listener),
        vec![OperationKind::UpdateCheckout, OperationKind::RefreshFragments]
    );
    services.settled().await.unwrap();
    assert_eq!(storefront.count("refresh_fragments"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_guarded_added_to_cart_fires_once_in_window() {
    let storefront = ScriptedStorefront::new();
    let services = CartServices::new(Settings::default(), storefront.clone());
    let mut listener = cart_listener(&services).await;

    services.cart().added_to_cart("42").unwrap();
    services.settled().await.unwrap();
    services.cart().added_to_cart("42").unwrap();
    services.settled().await.unwrap();

    let kinds = signal_kinds(&mut listener);
    let added = kinds
        .iter()
        .filter(|kind| **kind == OperationKind::AddedToCart)
        .count();
    assert_eq!(added, 1, "got {:?}", kinds);
}

#[tokio::test(start_paused = true)]
async fn test_item_removal_signals_checkout_update() {
    let storefront = ScriptedStorefront::new();
    let services = services(&storefront);
    let mut listener = cart_listener(&services).await;

    services.cart().update_quantity("abc123", 0).await.unwrap();
    services.settled().await.unwrap();

    assert_eq!(storefront.calls(), vec!["remove_item:abc123".to_string()]);
    let kinds = signal_kinds(&mut listener);
    assert!(kinds.contains(&OperationKind::RemovedFromCart));
    assert!(kinds.contains(&OperationKind::UpdateCheckout));
}
