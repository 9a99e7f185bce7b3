//! Shared fixtures for storefront integration tests

use async_trait::async_trait;
use cartsync::core::services::CartServices;
use cartsync::core::settings::Settings;
use cartsync::notifications::api::{Event, EventFilter, EventReceiver};
use cartsync::refresh::api::OperationKind;
use cartsync::remote::api::{
    CartResponse, CouponResponse, FormSubmission, Fragments, RemoteCartService, RemoteError,
    RemoteResult,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Storefront double with per-call scripted coupon responses
pub struct ScriptedStorefront {
    calls: Mutex<Vec<String>>,
    coupon_script: Mutex<VecDeque<RemoteResult<CouponResponse>>>,
    coupon_delay: Mutex<Duration>,
    fragments_down: Mutex<bool>,
}

impl ScriptedStorefront {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            coupon_script: Mutex::new(VecDeque::new()),
            coupon_delay: Mutex::new(Duration::ZERO),
            fragments_down: Mutex::new(false),
        })
    }

    /// Answer the next coupon call with `response`; unscripted calls succeed
    pub fn script_coupon(&self, response: RemoteResult<CouponResponse>) {
        self.coupon_script.lock().unwrap().push_back(response);
    }

    pub fn delay_coupons(&self, delay: Duration) {
        *self.coupon_delay.lock().unwrap() = delay;
    }

    pub fn take_fragments_down(&self) {
        *self.fragments_down.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn fragments() -> Fragments {
        let mut fragments = BTreeMap::new();
        fragments.insert(
            "div.widget_shopping_cart_content".to_string(),
            "<div class=\"widget_shopping_cart_content\"><ul></ul></div>".to_string(),
        );
        Fragments {
            fragments,
            cart_hash: Some("a1b2c3".to_string()),
        }
    }

    async fn coupon_call(&self, call: String) -> RemoteResult<CouponResponse> {
        self.calls.lock().unwrap().push(call);
        let delay = *self.coupon_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.coupon_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CouponResponse::applied()))
    }

    fn cart_call(&self, call: String) -> RemoteResult<CartResponse> {
        self.calls.lock().unwrap().push(call);
        Ok(CartResponse {
            success: true,
            fragments: Self::fragments(),
            cart_empty: false,
            message: None,
        })
    }
}

#[async_trait]
impl RemoteCartService for ScriptedStorefront {
    async fn refresh_fragments(&self) -> RemoteResult<Fragments> {
        self.calls.lock().unwrap().push("refresh_fragments".to_string());
        if *self.fragments_down.lock().unwrap() {
            return Err(RemoteError::Status {
                operation: "get_refreshed_fragments".to_string(),
                status: 503,
            });
        }
        Ok(Self::fragments())
    }

    async fn update_quantity(&self, item_key: &str, quantity: u32) -> RemoteResult<CartResponse> {
        self.cart_call(format!("update_quantity:{item_key}:{quantity}"))
    }

    async fn remove_item(&self, item_key: &str) -> RemoteResult<CartResponse> {
        self.cart_call(format!("remove_item:{item_key}"))
    }

    async fn apply_coupon(&self, code: &str) -> RemoteResult<CouponResponse> {
        self.coupon_call(format!("apply_coupon:{code}")).await
    }

    async fn remove_coupon(&self, code: &str) -> RemoteResult<CouponResponse> {
        self.coupon_call(format!("remove_coupon:{code}")).await
    }

    async fn submit_form(&self, form: &FormSubmission) -> RemoteResult<CouponResponse> {
        let code = form.field("coupon_code").unwrap_or_default().to_string();
        self.coupon_call(format!("submit_form:{}:{}", form.action, code))
            .await
    }
}

pub fn services(storefront: &Arc<ScriptedStorefront>) -> CartServices {
    CartServices::new(Settings::default(), storefront.clone())
}

pub async fn cart_listener(services: &CartServices) -> EventReceiver {
    services.notification_manager().await.subscribe(
        "listener".to_string(),
        EventFilter::CartOnly,
        "integration".to_string(),
    )
}

/// Cart signal kinds received so far, in order
pub fn signal_kinds(receiver: &mut EventReceiver) -> Vec<OperationKind> {
    let mut kinds = Vec::new();
    while let Some(event) = receiver.try_recv() {
        if let Event::Cart(cart) = event {
            kinds.push(cart.signal.kind());
        }
    }
    kinds
}
