//! Public API for coupon coordination

pub use crate::coupon::classify::classify;
pub use crate::coupon::coordinator::CouponCoordinator;
pub use crate::coupon::error::{CouponError, CouponResult};
pub use crate::coupon::types::{
    AppliedCouponsSource, ApplyContext, CheckoutPage, CouponOutcome, SessionCoupons,
    StaticCoupons, Surface,
};
