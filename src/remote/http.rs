//! WooCommerce `wc-ajax` client
//!
//! Posts to `{base_url}/?wc-ajax={action}` with a persistent cookie jar so the
//! storefront session survives across calls.

use crate::core::settings::RemoteSettings;
use crate::core::strings::notice_text;
use crate::core::version::user_agent;
use crate::remote::error::{RemoteError, RemoteResult};
use crate::remote::traits::RemoteCartService;
use crate::remote::types::{CartResponse, CouponResponse, Fragments, FormSubmission};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const FRAGMENTS_ACTION: &str = "get_refreshed_fragments";
const APPLY_COUPON_ACTION: &str = "apply_coupon";
const REMOVE_COUPON_ACTION: &str = "remove_coupon";

pub struct WooAjaxClient {
    client: reqwest::Client,
    base_url: String,
    security_nonce: Option<String>,
    update_quantity_action: String,
    remove_item_action: String,
}

impl WooAjaxClient {
    pub fn from_settings(settings: &RemoteSettings) -> RemoteResult<Self> {
        let base_url = settings
            .base_url
            .as_deref()
            .ok_or(RemoteError::NotConfigured)?
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(user_agent())
            .cookie_store(true)
            .build()
            .map_err(|e| RemoteError::Network {
                operation: "client setup".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            security_nonce: settings.security_nonce.clone(),
            update_quantity_action: settings.update_quantity_action.clone(),
            remove_item_action: settings.remove_item_action.clone(),
        })
    }

    pub fn endpoint(&self, action: &str) -> String {
        format!("{}/?wc-ajax={}", self.base_url, action)
    }

    async fn post(&self, action: &str, fields: &[(String, String)]) -> RemoteResult<String> {
        log::debug!("POST wc-ajax={} ({} fields)", action, fields.len());

        let response = self
            .client
            .post(self.endpoint(action))
            .form(fields)
            .send()
            .await
            .map_err(|e| map_transport_error(action, e))?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                operation: action.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| map_transport_error(action, e))
    }

    fn coupon_fields(&self, code: &str) -> Vec<(String, String)> {
        let mut fields = vec![("coupon_code".to_string(), code.to_string())];
        if let Some(nonce) = &self.security_nonce {
            fields.push(("security".to_string(), nonce.clone()));
        }
        fields
    }
}

fn map_transport_error(action: &str, error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        RemoteError::Timeout {
            operation: action.to_string(),
        }
    } else {
        RemoteError::Network {
            operation: action.to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct JsonEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<CartPayload>,
}

#[derive(Deserialize, Default)]
struct CartPayload {
    #[serde(default)]
    fragments: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    cart_hash: Option<String>,
    #[serde(default)]
    cart_empty: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Parse a cart mutation response
///
/// Accepts both the `wp_send_json_success` envelope used by theme endpoints
/// and a bare `{fragments, cart_hash}` object as returned by WooCommerce.
pub(crate) fn parse_cart_response(action: &str, body: &str) -> RemoteResult<CartResponse> {
    let decode_error = |e: serde_json::Error| RemoteError::Decode {
        operation: action.to_string(),
        message: e.to_string(),
    };

    let (success, payload) = match serde_json::from_str::<JsonEnvelope>(body) {
        Ok(envelope) => (envelope.success, envelope.data.unwrap_or_default()),
        Err(_) => {
            let payload: CartPayload = serde_json::from_str(body).map_err(decode_error)?;
            let success = !payload.fragments.is_empty();
            (success, payload)
        }
    };

    Ok(CartResponse {
        success,
        fragments: Fragments {
            fragments: payload.fragments,
            cart_hash: payload.cart_hash,
        },
        cart_empty: payload.cart_empty,
        message: payload.message,
    })
}

/// Interpret the HTML notice returned by the coupon endpoints
pub(crate) fn parse_coupon_notice(body: &str) -> CouponResponse {
    let success = !body.contains("woocommerce-error");
    let text = notice_text(body);
    CouponResponse {
        success,
        fragments: None,
        message: if text.is_empty() { None } else { Some(body.trim().to_string()) },
    }
}

#[async_trait]
impl RemoteCartService for WooAjaxClient {
    async fn refresh_fragments(&self) -> RemoteResult<Fragments> {
        let body = self.post(FRAGMENTS_ACTION, &[]).await?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode {
            operation: FRAGMENTS_ACTION.to_string(),
            message: e.to_string(),
        })
    }

    async fn update_quantity(&self, item_key: &str, quantity: u32) -> RemoteResult<CartResponse> {
        let fields = vec![
            ("cart_item_key".to_string(), item_key.to_string()),
            ("quantity".to_string(), quantity.to_string()),
        ];
        let body = self.post(&self.update_quantity_action, &fields).await?;
        parse_cart_response(&self.update_quantity_action, &body)
    }

    async fn remove_item(&self, item_key: &str) -> RemoteResult<CartResponse> {
        let fields = vec![("cart_item_key".to_string(), item_key.to_string())];
        let body = self.post(&self.remove_item_action, &fields).await?;
        parse_cart_response(&self.remove_item_action, &body)
    }

    async fn apply_coupon(&self, code: &str) -> RemoteResult<CouponResponse> {
        let body = self
            .post(APPLY_COUPON_ACTION, &self.coupon_fields(code))
            .await?;
        Ok(parse_coupon_notice(&body))
    }

    async fn remove_coupon(&self, code: &str) -> RemoteResult<CouponResponse> {
        let fields = match &self.security_nonce {
            Some(nonce) => vec![
                ("coupon".to_string(), code.to_string()),
                ("security".to_string(), nonce.clone()),
            ],
            None => vec![("coupon".to_string(), code.to_string())],
        };
        let body = self.post(REMOVE_COUPON_ACTION, &fields).await?;
        Ok(parse_coupon_notice(&body))
    }

    async fn submit_form(&self, form: &FormSubmission) -> RemoteResult<CouponResponse> {
        let mut fields = form.fields.clone();
        if let Some(nonce) = &self.security_nonce {
            if !fields.iter().any(|(name, _)| name == "security") {
                fields.push(("security".to_string(), nonce.clone()));
            }
        }
        let body = self.post(&form.action, &fields).await?;
        Ok(parse_coupon_notice(&body))
    }
}
