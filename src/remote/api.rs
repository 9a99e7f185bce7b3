//! Public API for the remote cart service

pub use crate::remote::error::{RemoteError, RemoteResult};
pub use crate::remote::http::WooAjaxClient;
pub use crate::remote::traits::RemoteCartService;
pub use crate::remote::types::{CartResponse, CouponResponse, FormSubmission, Fragments};
