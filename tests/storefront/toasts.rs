//! Toast stacking as seen by a renderer on the bus

use cartsync::core::settings::ToastSettings;
use cartsync::notifications::api::{
    AsyncNotificationManager, Event, EventFilter, EventReceiver, ToastEventType,
};
use cartsync::toast::api::{Position, Severity, ToastNotifier, ToastOptions};
use std::time::Duration;

async fn notifier_with_renderer(settings: ToastSettings) -> (ToastNotifier, EventReceiver) {
    let bus = AsyncNotificationManager::shared();
    let receiver = bus.lock().await.subscribe(
        "renderer".to_string(),
        EventFilter::ToastOnly,
        "integration".to_string(),
    );
    (ToastNotifier::new(settings, Some(bus)), receiver)
}

fn event_types(receiver: &mut EventReceiver) -> Vec<ToastEventType> {
    let mut types = Vec::new();
    while let Some(Event::Toast(toast)) = receiver.try_recv() {
        types.push(toast.event_type);
    }
    types
}

#[tokio::test(start_paused = true)]
async fn test_repeated_message_shows_one_toast_with_badge() {
    let (toasts, mut renderer) = notifier_with_renderer(ToastSettings::default()).await;

    for _ in 0..3 {
        toasts
            .warning("Out of stock", ToastOptions::default())
            .await
            .unwrap();
    }

    let visible = toasts.visible(Position::TopRight).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].badge().as_deref(), Some("(3)"));
    assert_eq!(visible[0].severity, Severity::Warning);
    assert_eq!(
        event_types(&mut renderer),
        vec![
            ToastEventType::Shown,
            ToastEventType::Updated,
            ToastEventType::Updated
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_full_stack_queues_and_promotes_in_order() {
    let (toasts, mut renderer) = notifier_with_renderer(ToastSettings::default()).await;

    let mut ids = Vec::new();
    for n in 1..=5 {
        ids.push(
            toasts
                .info(&format!("Item {n} added"), ToastOptions::default())
                .await
                .unwrap(),
        );
    }
    assert_eq!(toasts.visible(Position::TopRight).unwrap().len(), 3);
    assert_eq!(toasts.queued_len(Position::TopRight).unwrap(), 2);

    assert!(toasts.dismiss(ids[0]).await.unwrap());

    let texts: Vec<String> = toasts
        .visible(Position::TopRight)
        .unwrap()
        .into_iter()
        .map(|toast| toast.text)
        .collect();
    assert_eq!(texts, vec!["Item 2 added", "Item 3 added", "Item 4 added"]);
    assert_eq!(toasts.queued_len(Position::TopRight).unwrap(), 1);

    let types = event_types(&mut renderer);
    assert_eq!(
        types.iter().filter(|t| **t == ToastEventType::Queued).count(),
        2
    );
    assert_eq!(
        types.iter().filter(|t| **t == ToastEventType::Shown).count(),
        4
    );
}

#[tokio::test(start_paused = true)]
async fn test_expiry_drains_the_whole_stack() {
    let settings = ToastSettings {
        duration_ms: 1000,
        ..ToastSettings::default()
    };
    let (toasts, _renderer) = notifier_with_renderer(settings).await;

    for n in 1..=4 {
        toasts
            .error(&format!("Error {n}"), ToastOptions::default())
            .await
            .unwrap();
    }

    tokio::time::sleep(Duration::from_millis(1001)).await;
    let visible = toasts.visible(Position::TopRight).unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].text, "Error 4");

    tokio::time::sleep(Duration::from_millis(1001)).await;
    assert!(toasts.visible(Position::TopRight).unwrap().is_empty());
    assert_eq!(toasts.queued_len(Position::TopRight).unwrap(), 0);
}
