//! Runtime settings for the coordinator services
//!
//! Every field has a default so an empty (or absent) configuration file yields
//! the stock storefront behaviour. Values are read from TOML:
//!
//! ```toml
//! [refresh]
//! debounce_ms = 50
//! max_retries = 3
//! guarded_kinds = ["added_to_cart", "removed_from_cart"]
//!
//! [refresh.priorities]
//! update_checkout = 1
//!
//! [toast]
//! max_visible = 3
//! position = "top-right"
//!
//! [remote]
//! base_url = "https://shop.example.com"
//! ```

use crate::refresh::api::OperationKind;
use crate::toast::api::Position;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for '{field}': {message}")]
    Invalid { field: String, message: String },

    #[error("Failed to parse configuration file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Configuration file does not exist: {path}")]
    Missing { path: String },
}

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { message, .. }
            | ConfigError::Parse { message, .. }
            | ConfigError::Io { message, .. } => Some(message),
            ConfigError::Missing { path } => Some(path),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub refresh: RefreshSettings,
    pub coupon: CouponSettings,
    pub toast: ToastSettings,
    pub remote: RemoteSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(contents: &str, path: &str) -> ConfigResult<Self> {
        let settings: Settings = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the services cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.toast.max_visible == 0 {
            return Err(invalid("toast.max_visible", "must be greater than 0"));
        }
        if self.toast.max_text_graphemes == 0 {
            return Err(invalid("toast.max_text_graphemes", "must be greater than 0"));
        }
        if self.coupon.processing_timeout_ms == 0 {
            return Err(invalid(
                "coupon.processing_timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.refresh.busy_retry_ms == 0 {
            return Err(invalid("refresh.busy_retry_ms", "must be greater than 0"));
        }
        if let Some(url) = &self.remote.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(invalid(
                    "remote.base_url",
                    "only http:// and https:// URLs are supported",
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: format!("{field} {message}"),
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RefreshSettings {
    /// Quiet period after the last enqueue before a drain starts
    pub debounce_ms: u64,
    /// Delay between two successfully executed operations
    pub pacing_ms: u64,
    /// Delay before retrying a drain that found a batch already running
    pub busy_retry_ms: u64,
    pub max_retries: u32,
    /// Window of the per-kind "already fired recently" guard
    pub recent_fire_window_ms: u64,
    pub guarded_kinds: Vec<OperationKind>,
    /// Overrides of the per-kind default priorities
    pub priorities: HashMap<OperationKind, i32>,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            pacing_ms: 10,
            busy_retry_ms: 100,
            max_retries: 3,
            recent_fire_window_ms: 1000,
            guarded_kinds: vec![OperationKind::AddedToCart, OperationKind::RemovedFromCart],
            priorities: HashMap::new(),
        }
    }
}

impl RefreshSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn busy_retry(&self) -> Duration {
        Duration::from_millis(self.busy_retry_ms)
    }

    pub fn recent_fire_window(&self) -> Duration {
        Duration::from_millis(self.recent_fire_window_ms)
    }

    /// Priority for a kind, honouring configured overrides
    pub fn priority_for(&self, kind: OperationKind) -> i32 {
        self.priorities
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_priority())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CouponSettings {
    /// Age after which an unsettled attempt no longer blocks a retry
    pub processing_timeout_ms: u64,
    /// Delay of the safety clear scheduled for every attempt
    pub clear_delay_ms: u64,
    /// Delay of the "remove the coupon" prompt after a usage-limit error
    pub follow_up_delay_ms: u64,
}

impl Default for CouponSettings {
    fn default() -> Self {
        Self {
            processing_timeout_ms: 3000,
            clear_delay_ms: 3000,
            follow_up_delay_ms: 500,
        }
    }
}

impl CouponSettings {
    pub fn processing_timeout(&self) -> Duration {
        Duration::from_millis(self.processing_timeout_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }

    pub fn follow_up_delay(&self) -> Duration {
        Duration::from_millis(self.follow_up_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToastSettings {
    pub duration_ms: u64,
    pub max_visible: usize,
    pub dedupe_window_ms: u64,
    pub pause_on_hover: bool,
    pub position: Position,
    pub max_text_graphemes: usize,
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            duration_ms: 4000,
            max_visible: 3,
            dedupe_window_ms: 2000,
            pause_on_hover: true,
            position: Position::TopRight,
            max_text_graphemes: 240,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteSettings {
    /// Storefront root, e.g. `https://shop.example.com`
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    /// `security` nonce echoed with coupon requests when the storefront checks it
    pub security_nonce: Option<String>,
    pub update_quantity_action: String,
    pub remove_item_action: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 15,
            security_nonce: None,
            update_quantity_action: "update_cart_item_qty".to_string(),
            remove_item_action: "remove_cart_item".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<String>,
}
