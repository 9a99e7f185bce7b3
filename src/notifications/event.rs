//! Event types for the notification system

use std::sync::Arc;
use std::time::SystemTime;

use crate::coupon::api::Surface;
use crate::refresh::api::OperationKind;
use crate::remote::api::Fragments;
use crate::toast::api::ToastSnapshot;

/// Storefront signals raised when a queued refresh operation executes
///
/// Listeners on the page (mini-cart, checkout totals, analytics) react to
/// these instead of reaching into the refresh queue.
#[derive(Clone, Debug, PartialEq)]
pub enum CartSignal {
    /// Fresh markup for the cart fragments, keyed by selector
    RefreshFragments { fragments: Arc<Fragments> },
    /// Checkout totals need to be recalculated
    UpdateCheckout,
    AddedToCart { product_id: Option<String> },
    RemovedFromCart { item_key: Option<String> },
}

impl CartSignal {
    pub fn kind(&self) -> OperationKind {
        match self {
            CartSignal::RefreshFragments { .. } => OperationKind::RefreshFragments,
            CartSignal::UpdateCheckout => OperationKind::UpdateCheckout,
            CartSignal::AddedToCart { .. } => OperationKind::AddedToCart,
            CartSignal::RemovedFromCart { .. } => OperationKind::RemovedFromCart,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CartEvent {
    pub signal: CartSignal,
    pub timestamp: SystemTime,
}

impl CartEvent {
    pub fn new(signal: CartSignal) -> Self {
        Self {
            signal,
            timestamp: SystemTime::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CouponEventType {
    Applied,
    AlreadyApplied,
    Rejected,
    Removed,
    /// Inline message for the originating form when no toast surface is wired
    InlineNotice,
}

#[derive(Clone, Debug)]
pub struct CouponEvent {
    pub event_type: CouponEventType,
    pub timestamp: SystemTime,
    pub code: String,
    pub surface: Surface,
    pub message: Option<String>,
    /// Originating form, for inline notices
    pub form: Option<String>,
}

impl CouponEvent {
    pub fn new(event_type: CouponEventType, code: String, surface: Surface) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            code,
            surface,
            message: None,
            form: None,
        }
    }

    pub fn with_message(
        event_type: CouponEventType,
        code: String,
        surface: Surface,
        message: String,
    ) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            code,
            surface,
            message: Some(message),
            form: None,
        }
    }

    pub fn for_form(mut self, form: Option<String>) -> Self {
        self.form = form;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ToastEventType {
    Shown,
    /// Duplicate badge changed
    Updated,
    Queued,
    Dismissed,
}

#[derive(Clone, Debug)]
pub struct ToastEvent {
    pub event_type: ToastEventType,
    pub timestamp: SystemTime,
    pub toast: ToastSnapshot,
}

impl ToastEvent {
    pub fn new(event_type: ToastEventType, toast: ToastSnapshot) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            toast,
        }
    }
}

/// Unified event enum that encompasses all event types
#[derive(Clone, Debug)]
pub enum Event {
    Cart(CartEvent),
    Coupon(CouponEvent),
    Toast(ToastEvent),
}

impl Event {
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::Cart(_) => "Cart",
            Event::Coupon(_) => "Coupon",
            Event::Toast(_) => "Toast",
        }
    }
}

/// Event filtering options for subscribers
#[derive(Clone, Debug, PartialEq)]
pub enum EventFilter {
    CartOnly,
    /// A single cart signal kind
    CartKind(OperationKind),
    CouponOnly,
    ToastOnly,
    CartAndCoupon,
    All,
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &Event) -> bool {
        match (self, event) {
            (EventFilter::CartKind(kind), Event::Cart(cart)) => cart.signal.kind() == *kind,
            _ => matches!(
                (self, event),
                (EventFilter::CartOnly, Event::Cart(_))
                    | (EventFilter::CouponOnly, Event::Coupon(_))
                    | (EventFilter::ToastOnly, Event::Toast(_))
                    | (EventFilter::CartAndCoupon, Event::Cart(_))
                    | (EventFilter::CartAndCoupon, Event::Coupon(_))
                    | (EventFilter::All, _)
            ),
        }
    }
}
