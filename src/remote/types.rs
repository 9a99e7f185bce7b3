//! Request and response shapes exchanged with the storefront

use serde::Deserialize;
use std::collections::BTreeMap;

/// Cart fragments: replacement markup keyed by DOM selector
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Fragments {
    #[serde(default)]
    pub fragments: BTreeMap<String, String>,
    #[serde(default)]
    pub cart_hash: Option<String>,
}

impl Fragments {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn get(&self, selector: &str) -> Option<&str> {
        self.fragments.get(selector).map(String::as_str)
    }
}

/// Result of a quantity update or item removal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartResponse {
    pub success: bool,
    pub fragments: Fragments,
    pub cart_empty: bool,
    pub message: Option<String>,
}

/// Result of a coupon apply/remove call
///
/// `message` holds the storefront notice as returned (usually HTML).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponResponse {
    pub success: bool,
    pub fragments: Option<Fragments>,
    pub message: Option<String>,
}

impl CouponResponse {
    pub fn applied() -> Self {
        Self {
            success: true,
            fragments: None,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            fragments: None,
            message: Some(message.into()),
        }
    }
}

/// A form posted to a `wc-ajax` action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            fields: Vec::new(),
        }
    }

    /// Set a field, replacing an existing value with the same name
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}
