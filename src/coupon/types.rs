//! Coupon surfaces, call context and outcomes

use crate::core::strings::normalize_coupon_code;
use crate::core::sync::handle_mutex_poison;
use crate::coupon::error::{CouponError, CouponResult};
use crate::remote::api::FormSubmission;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Mutex;
use strum_macros::{AsRefStr, Display};

/// Where a coupon form lives on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Surface {
    CartDrawer,
    Checkout,
}

type Callback = Box<dyn FnOnce(&str) + Send + Sync>;

/// Caller context for a coupon apply/remove
///
/// Callbacks receive the message shown for a success, or the raw storefront
/// message for a failure. Each runs at most once.
pub struct ApplyContext {
    pub surface: Surface,
    form: Option<String>,
    on_success: Option<Callback>,
    on_error: Option<Callback>,
}

impl ApplyContext {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            form: None,
            on_success: None,
            on_error: None,
        }
    }

    pub fn cart_drawer() -> Self {
        Self::new(Surface::CartDrawer)
    }

    pub fn checkout() -> Self {
        Self::new(Surface::Checkout)
    }

    /// Identify the originating form for inline feedback
    pub fn form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    pub fn on_success(mut self, callback: impl FnOnce(&str) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn form_id(&self) -> Option<&str> {
        self.form.as_deref()
    }

    pub(crate) fn succeed(&mut self, message: &str) {
        if let Some(callback) = self.on_success.take() {
            callback(message);
        }
    }

    pub(crate) fn fail(&mut self, message: &str) {
        if let Some(callback) = self.on_error.take() {
            callback(message);
        }
    }
}

impl fmt::Debug for ApplyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplyContext")
            .field("surface", &self.surface)
            .field("form", &self.form)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CouponOutcome {
    Applied { code: String },
    /// Already on the cart; nothing was sent
    AlreadyApplied { code: String },
    /// An attempt for this code is still running; this call was dropped
    InFlight { code: String },
    Removed { code: String },
    Rejected { code: String, reason: CouponError },
    /// Nothing to apply
    EmptyCode,
}

/// Something on the page that knows which coupons the cart carries
pub trait AppliedCouponsSource: Send + Sync {
    /// Codes as found, in any case
    fn applied_codes(&self) -> Vec<String>;
}

/// Coupons applied or removed through the coordinator during this session
#[derive(Debug, Default)]
pub struct SessionCoupons {
    codes: Mutex<BTreeSet<String>>,
}

impl SessionCoupons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, code: &str) -> CouponResult<()> {
        self.lock()?.insert(normalize_coupon_code(code));
        Ok(())
    }

    pub fn remove(&self, code: &str) -> CouponResult<bool> {
        Ok(self.lock()?.remove(&normalize_coupon_code(code)))
    }

    fn lock(&self) -> CouponResult<std::sync::MutexGuard<'_, BTreeSet<String>>> {
        handle_mutex_poison(self.codes.lock(), |message| CouponError::State { message })
    }
}

impl AppliedCouponsSource for SessionCoupons {
    fn applied_codes(&self) -> Vec<String> {
        match self.codes.lock() {
            Ok(codes) => codes.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }
}

/// A fixed list, e.g. the codes embedded in the page when it was rendered
#[derive(Debug, Clone, Default)]
pub struct StaticCoupons(pub Vec<String>);

impl AppliedCouponsSource for StaticCoupons {
    fn applied_codes(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Access to the checkout page's own coupon form
pub trait CheckoutPage: Send + Sync {
    /// The native form with its current fields, if the page renders one
    fn coupon_form(&self) -> Option<FormSubmission>;
}
