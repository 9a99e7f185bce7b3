//! Scripted remote service for unit tests

use crate::remote::error::{RemoteError, RemoteResult};
use crate::remote::traits::RemoteCartService;
use crate::remote::types::{CartResponse, CouponResponse, FormSubmission, Fragments};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) struct FakeRemote {
    calls: Mutex<Vec<String>>,
    fragment_failures: AtomicU32,
    delay: Mutex<Duration>,
    fragments: Mutex<Fragments>,
    cart_response: Mutex<RemoteResult<CartResponse>>,
    coupon_response: Mutex<RemoteResult<CouponResponse>>,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        let mut fragments = BTreeMap::new();
        fragments.insert(
            "span.cart-count".to_string(),
            "<span class=\"cart-count\">1</span>".to_string(),
        );
        let fragments = Fragments {
            fragments,
            cart_hash: Some("hash-1".to_string()),
        };
        Self {
            calls: Mutex::new(Vec::new()),
            fragment_failures: AtomicU32::new(0),
            delay: Mutex::new(Duration::ZERO),
            cart_response: Mutex::new(Ok(CartResponse {
                success: true,
                fragments: fragments.clone(),
                cart_empty: false,
                message: None,
            })),
            fragments: Mutex::new(fragments),
            coupon_response: Mutex::new(Ok(CouponResponse::applied())),
        }
    }

    /// Make the next `count` fragment fetches fail (`u32::MAX`: always)
    pub(crate) fn fail_fragments(&self, count: u32) {
        self.fragment_failures.store(count, Ordering::SeqCst);
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub(crate) fn set_cart_response(&self, response: RemoteResult<CartResponse>) {
        *self.cart_response.lock().unwrap() = response;
    }

    pub(crate) fn set_coupon_response(&self, response: RemoteResult<CouponResponse>) {
        *self.coupon_response.lock().unwrap() = response;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    async fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteCartService for FakeRemote {
    async fn refresh_fragments(&self) -> RemoteResult<Fragments> {
        self.record("refresh_fragments".to_string()).await;
        let remaining = self.fragment_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.fragment_failures.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(RemoteError::Timeout {
                operation: "get_refreshed_fragments".to_string(),
            });
        }
        Ok(self.fragments.lock().unwrap().clone())
    }

    async fn update_quantity(&self, item_key: &str, quantity: u32) -> RemoteResult<CartResponse> {
        self.record(format!("update_quantity:{item_key}:{quantity}"))
            .await;
        self.cart_response.lock().unwrap().clone()
    }

    async fn remove_item(&self, item_key: &str) -> RemoteResult<CartResponse> {
        self.record(format!("remove_item:{item_key}")).await;
        self.cart_response.lock().unwrap().clone()
    }

    async fn apply_coupon(&self, code: &str) -> RemoteResult<CouponResponse> {
        self.record(format!("apply_coupon:{code}")).await;
        self.coupon_response.lock().unwrap().clone()
    }

    async fn remove_coupon(&self, code: &str) -> RemoteResult<CouponResponse> {
        self.record(format!("remove_coupon:{code}")).await;
        self.coupon_response.lock().unwrap().clone()
    }

    async fn submit_form(&self, form: &FormSubmission) -> RemoteResult<CouponResponse> {
        self.record(format!(
            "submit_form:{}:{}",
            form.action,
            form.field("coupon_code").unwrap_or_default()
        ))
        .await;
        self.coupon_response.lock().unwrap().clone()
    }
}
