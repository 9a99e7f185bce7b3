//! Coupon test fixtures

use crate::core::settings::{CouponSettings, RefreshSettings, ToastSettings};
use crate::coupon::coordinator::CouponCoordinator;
use crate::notifications::api::{AsyncNotificationManager, SharedNotificationManager};
use crate::refresh::api::{OperationExecutor, QueuedOperation, RefreshQueue, RefreshResult};
use crate::remote::testing::FakeRemote;
use crate::toast::api::{Position, ToastNotifier, ToastSnapshot};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub struct NoopExecutor;

#[async_trait]
impl OperationExecutor for NoopExecutor {
    async fn execute(&self, _operation: &QueuedOperation) -> RefreshResult<()> {
        Ok(())
    }
}

pub struct Fixture {
    pub remote: Arc<FakeRemote>,
    pub queue: RefreshQueue,
    pub toasts: ToastNotifier,
    pub notifications: SharedNotificationManager,
}

impl Fixture {
    pub fn new() -> Self {
        let notifications = AsyncNotificationManager::shared();
        Self {
            remote: Arc::new(FakeRemote::new()),
            queue: RefreshQueue::new(RefreshSettings::default(), Arc::new(NoopExecutor)),
            toasts: ToastNotifier::new(ToastSettings::default(), Some(notifications.clone())),
            notifications,
        }
    }

    /// Coordinator without a toast surface
    pub fn bare_coordinator(&self) -> CouponCoordinator {
        CouponCoordinator::new(
            CouponSettings::default(),
            self.remote.clone(),
            self.queue.clone(),
            self.notifications.clone(),
        )
    }

    pub fn coordinator(&self) -> CouponCoordinator {
        self.bare_coordinator().with_toasts(self.toasts.clone())
    }

    pub fn visible_toasts(&self) -> Vec<ToastSnapshot> {
        self.toasts.visible(Position::TopRight).unwrap()
    }
}

/// Collects callback invocations
#[derive(Clone, Default)]
pub struct CallbackLog(Arc<Mutex<Vec<String>>>);

impl CallbackLog {
    pub fn recorder(&self, prefix: &'static str) -> impl FnOnce(&str) + Send + 'static {
        let log = self.0.clone();
        move |message: &str| log.lock().unwrap().push(format!("{prefix}:{message}"))
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
