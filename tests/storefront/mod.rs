pub mod coupons;
pub mod refresh;
pub mod toasts;
