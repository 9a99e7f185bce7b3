//! Coupon error types

use crate::remote::api::RemoteError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CouponError {
    /// Validation or business rule rejection (expired, minimum spend, ...)
    #[error("{message}")]
    Rejected { code: String, message: String },

    /// The coupon's usage limit is exhausted; the shopper has to remove it
    #[error("{message}")]
    UsageLimit { code: String, message: String },

    #[error("Coupon request for '{code}' failed: {source}")]
    Remote {
        code: String,
        #[source]
        source: RemoteError,
    },

    #[error("Coupon state unavailable: {message}")]
    State { message: String },
}

impl CouponError {
    pub fn is_usage_limit(&self) -> bool {
        matches!(self, CouponError::UsageLimit { .. })
    }
}

impl crate::core::error_handling::ContextualError for CouponError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            CouponError::Rejected { .. } | CouponError::UsageLimit { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            CouponError::Rejected { message, .. } | CouponError::UsageLimit { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }
}

pub type CouponResult<T> = Result<T, CouponError>;
