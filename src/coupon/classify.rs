//! Interpretation of coupon responses

use crate::core::strings::notice_text;
use crate::coupon::error::CouponError;
use crate::remote::api::{CouponResponse, RemoteResult};
use regex::Regex;
use std::sync::LazyLock;

static USAGE_LIMIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)usage\s+limit|no\s+longer\s+(?:valid|available)")
        .expect("usage limit pattern is valid")
});

const FALLBACK_REJECTION: &str = "Sorry, this coupon could not be applied.";

/// Sort a coupon response into success or one of the failure classes
pub fn classify(code: &str, result: RemoteResult<CouponResponse>) -> Result<CouponResponse, CouponError> {
    let response = result.map_err(|source| CouponError::Remote {
        code: code.to_string(),
        source,
    })?;
    if response.success {
        return Ok(response);
    }

    let message = response
        .message
        .as_deref()
        .map(notice_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| FALLBACK_REJECTION.to_string());

    if USAGE_LIMIT_PATTERN.is_match(&message) {
        Err(CouponError::UsageLimit {
            code: code.to_string(),
            message,
        })
    } else {
        Err(CouponError::Rejected {
            code: code.to_string(),
            message,
        })
    }
}
