//! Coupon application across the cart drawer and checkout

use crate::common::{cart_listener, services, signal_kinds, ScriptedStorefront};
use cartsync::core::services::CartServices;
use cartsync::core::settings::Settings;
use cartsync::coupon::api::{ApplyContext, CouponOutcome, StaticCoupons};
use cartsync::refresh::api::OperationKind;
use cartsync::remote::api::{CouponResponse, RemoteError};
use cartsync::toast::api::{Severity, ToastSnapshot};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn visible(services: &CartServices) -> Vec<ToastSnapshot> {
    services
        .toasts()
        .visible(services.settings().toast.position)
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_rapid_double_apply_sends_one_request() {
    let storefront = ScriptedStorefront::new();
    storefront.delay_coupons(Duration::from_millis(200));
    let services = services(&storefront);

    let coupons = Arc::clone(services.coupons());
    let first =
        tokio::spawn(async move { coupons.apply("save10", ApplyContext::cart_drawer()).await });
    tokio::task::yield_now().await;

    let second = services
        .coupons()
        .apply("SAVE10", ApplyContext::checkout())
        .await
        .unwrap();
    assert_eq!(
        second,
        CouponOutcome::InFlight {
            code: "SAVE10".to_string()
        }
    );

    let first = first.await.unwrap().unwrap();
    assert_eq!(
        first,
        CouponOutcome::Applied {
            code: "SAVE10".to_string()
        }
    );
    assert_eq!(storefront.count("apply_coupon"), 1);
    assert!(!services.coupons().is_in_flight("save10").unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_already_applied_coupon_skips_request() {
    let storefront = ScriptedStorefront::new();
    let services = CartServices::builder(Settings::default(), storefront.clone())
        .applied_coupons_source(Arc::new(StaticCoupons(vec!["save10".to_string()])))
        .build();

    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();
    let outcome = services
        .coupons()
        .apply(
            " Save10 ",
            ApplyContext::cart_drawer().on_success(move |m| sink.lock().unwrap().push(m.to_string())),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, CouponOutcome::AlreadyApplied { .. }));
    assert!(storefront.calls().is_empty());
    assert_eq!(messages.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_attempt_no_longer_blocks() {
    let storefront = ScriptedStorefront::new();
    storefront.delay_coupons(Duration::from_secs(10));
    let services = services(&storefront);

    let coupons = Arc::clone(services.coupons());
    let _hung =
        tokio::spawn(async move { coupons.apply("SAVE10", ApplyContext::cart_drawer()).await });
    tokio::task::yield_now().await;
    assert!(services.coupons().is_in_flight("SAVE10").unwrap());

    tokio::time::sleep(services.settings().coupon.processing_timeout()).await;
    assert!(!services.coupons().is_in_flight("SAVE10").unwrap());

    storefront.delay_coupons(Duration::ZERO);
    let retry = services
        .coupons()
        .apply("SAVE10", ApplyContext::cart_drawer())
        .await
        .unwrap();
    assert!(matches!(retry, CouponOutcome::Applied { .. }));
    assert_eq!(storefront.count("apply_coupon"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_usage_limit_prompts_removal_after_delay() {
    let storefront = ScriptedStorefront::new();
    storefront.script_coupon(Ok(CouponResponse::rejected(
        "<ul class=\"woocommerce-error\"><li>Coupon usage limit has been reached.</li></ul>",
    )));
    let services = services(&storefront);

    let outcome = services
        .coupons()
        .apply("SAVE10", ApplyContext::cart_drawer())
        .await
        .unwrap();
    match &outcome {
        CouponOutcome::Rejected { reason, .. } => assert!(reason.is_usage_limit()),
        other => panic!("expected rejection, got {:?}", other),
    }

    let toasts = visible(&services);
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, Severity::Error);
    assert_eq!(toasts[0].text, "Coupon usage limit has been reached.");

    tokio::time::sleep(services.settings().coupon.follow_up_delay() + Duration::from_millis(1)).await;

    let toasts = visible(&services);
    assert_eq!(toasts.len(), 2);
    assert_eq!(toasts[1].severity, Severity::Warning);
    assert_eq!(toasts[1].text, "Please remove the coupon \"SAVE10\" to continue.");
}

#[tokio::test(start_paused = true)]
async fn test_network_failure_shows_generic_message() {
    let storefront = ScriptedStorefront::new();
    storefront.script_coupon(Err(RemoteError::Timeout {
        operation: "apply_coupon".to_string(),
    }));
    let services = services(&storefront);

    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let outcome = services
        .coupons()
        .apply(
            "SAVE10",
            ApplyContext::cart_drawer().on_error(move |m| sink.lock().unwrap().push(m.to_string())),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, CouponOutcome::Rejected { .. }));
    assert_eq!(visible(&services)[0].text, "Network error, please try again.");
    assert_eq!(errors.lock().unwrap().len(), 1);
    // Not retried
    assert_eq!(storefront.count("apply_coupon"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_checkout_apply_submits_form_and_updates_totals() {
    let storefront = ScriptedStorefront::new();
    let services = services(&storefront);
    let mut listener = cart_listener(&services).await;

    let outcome = services
        .coupons()
        .apply("freeship", ApplyContext::checkout())
        .await
        .unwrap();
    services.settled().await.unwrap();

    assert!(matches!(outcome, CouponOutcome::Applied { .. }));
    assert_eq!(
        storefront.calls()[0],
        "submit_form:apply_coupon:FREESHIP".to_string()
    );
    let kinds = signal_kinds(&mut listener);
    assert_eq!(kinds[0], OperationKind::RefreshFragments);
    assert!(kinds.contains(&OperationKind::UpdateCheckout));
    assert!(services.coupons().get_applied_coupons().contains("FREESHIP"));
}

#[tokio::test(start_paused = true)]
async fn test_echoed_code_is_escaped() {
    let storefront = ScriptedStorefront::new();
    let services = services(&storefront);

    services
        .coupons()
        .apply("<b>vip</b>", ApplyContext::cart_drawer())
        .await
        .unwrap();

    let text = &visible(&services)[0].text;
    assert_eq!(text, "Coupon \"&lt;B&gt;VIP&lt;/B&gt;\" applied successfully.");
}
