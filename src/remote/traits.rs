//! The request/response boundary to the storefront

use crate::remote::error::RemoteResult;
use crate::remote::types::{CartResponse, CouponResponse, Fragments, FormSubmission};
use async_trait::async_trait;

/// Server-side cart endpoints
///
/// Session state (which cart, which customer) is implicit in the
/// implementation: a browser cookie jar for the HTTP client, captured state
/// for test doubles.
#[async_trait]
pub trait RemoteCartService: Send + Sync {
    async fn refresh_fragments(&self) -> RemoteResult<Fragments>;

    async fn update_quantity(&self, item_key: &str, quantity: u32) -> RemoteResult<CartResponse>;

    async fn remove_item(&self, item_key: &str) -> RemoteResult<CartResponse>;

    async fn apply_coupon(&self, code: &str) -> RemoteResult<CouponResponse>;

    async fn remove_coupon(&self, code: &str) -> RemoteResult<CouponResponse>;

    /// Post a checkout form (native or synthesized) to its action
    async fn submit_form(&self, form: &FormSubmission) -> RemoteResult<CouponResponse>;
}
