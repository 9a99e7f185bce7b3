//! Composition root
//!
//! Builds one instance of every coordinator service for a page session and
//! wires them together. There are no globals: whoever needs a service gets
//! it from the [`CartServices`] they were handed.

use crate::cart::api::{CartActions, FragmentStore};
use crate::core::settings::Settings;
use crate::coupon::api::{AppliedCouponsSource, CheckoutPage, CouponCoordinator};
use crate::notifications::api::{AsyncNotificationManager, SharedNotificationManager};
use crate::refresh::api::{RecentFireGuard, RefreshQueue, RefreshResult, SignalExecutor};
use crate::remote::api::RemoteCartService;
use crate::toast::api::ToastNotifier;
use std::sync::Arc;
use tokio::sync::MutexGuard;

pub struct CartServices {
    settings: Settings,
    notifications: SharedNotificationManager,
    fragments: Arc<FragmentStore>,
    queue: RefreshQueue,
    toasts: ToastNotifier,
    coupons: Arc<CouponCoordinator>,
    cart: Arc<CartActions>,
}

pub struct CartServicesBuilder {
    settings: Settings,
    remote: Arc<dyn RemoteCartService>,
    checkout_page: Option<Arc<dyn CheckoutPage>>,
    sources: Vec<Arc<dyn AppliedCouponsSource>>,
}

impl CartServicesBuilder {
    pub fn checkout_page(mut self, page: Arc<dyn CheckoutPage>) -> Self {
        self.checkout_page = Some(page);
        self
    }

    pub fn applied_coupons_source(mut self, source: Arc<dyn AppliedCouponsSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn build(self) -> CartServices {
        let settings = self.settings;
        let notifications = AsyncNotificationManager::shared();
        let fragments = Arc::new(FragmentStore::new());

        let guard = RecentFireGuard::new(
            settings.refresh.recent_fire_window(),
            settings.refresh.guarded_kinds.iter().copied(),
        );
        let executor = Arc::new(SignalExecutor::new(
            Arc::clone(&self.remote),
            Arc::clone(&fragments),
            Arc::clone(&notifications),
            guard,
        ));
        let queue = RefreshQueue::new(settings.refresh.clone(), executor);

        let toasts = ToastNotifier::new(settings.toast.clone(), Some(Arc::clone(&notifications)));

        let mut coupons = CouponCoordinator::new(
            settings.coupon.clone(),
            Arc::clone(&self.remote),
            queue.clone(),
            Arc::clone(&notifications),
        )
        .with_toasts(toasts.clone());
        if let Some(page) = self.checkout_page {
            coupons = coupons.with_checkout_page(page);
        }
        for source in self.sources {
            coupons = coupons.with_source(source);
        }

        let cart = CartActions::new(self.remote, queue.clone(), Arc::clone(&fragments))
            .with_toasts(toasts.clone());

        log::debug!("Cart services ready");
        CartServices {
            settings,
            notifications,
            fragments,
            queue,
            toasts,
            coupons: Arc::new(coupons),
            cart: Arc::new(cart),
        }
    }
}

impl CartServices {
    pub fn builder(settings: Settings, remote: Arc<dyn RemoteCartService>) -> CartServicesBuilder {
        CartServicesBuilder {
            settings,
            remote,
            checkout_page: None,
            sources: Vec::new(),
        }
    }

    pub fn new(settings: Settings, remote: Arc<dyn RemoteCartService>) -> Self {
        Self::builder(settings, remote).build()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Lock the signal bus, e.g. to subscribe a listener
    pub async fn notification_manager(&self) -> MutexGuard<'_, AsyncNotificationManager> {
        self.notifications.lock().await
    }

    pub fn notifications(&self) -> SharedNotificationManager {
        Arc::clone(&self.notifications)
    }

    pub fn fragments(&self) -> &Arc<FragmentStore> {
        &self.fragments
    }

    pub fn refresh_queue(&self) -> &RefreshQueue {
        &self.queue
    }

    pub fn toasts(&self) -> &ToastNotifier {
        &self.toasts
    }

    pub fn coupons(&self) -> &Arc<CouponCoordinator> {
        &self.coupons
    }

    pub fn cart(&self) -> &Arc<CartActions> {
        &self.cart
    }

    /// Wait for queued refresh work to finish
    pub async fn settled(&self) -> RefreshResult<()> {
        self.queue.settled().await
    }
}
