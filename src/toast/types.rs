//! Toast value types

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Screen anchor a toast stack is attached to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopCenter,
    #[default]
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(pub u64);

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

/// Per-call options; unset fields fall back to the notifier settings
#[derive(Debug, Clone, PartialEq)]
pub struct ToastOptions {
    pub severity: Severity,
    pub duration: Option<Duration>,
    pub position: Option<Position>,
    pub pause_on_hover: Option<bool>,
    pub max_visible: Option<usize>,
    pub dedupe_window: Option<Duration>,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl ToastOptions {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            duration: None,
            position: None,
            pause_on_hover: None,
            max_visible: None,
            dedupe_window: None,
        }
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn pause_on_hover(mut self, pause: bool) -> Self {
        self.pause_on_hover = Some(pause);
        self
    }

    pub fn max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = Some(max_visible);
        self
    }

    pub fn dedupe_window(mut self, window: Duration) -> Self {
        self.dedupe_window = Some(window);
        self
    }
}

/// Read-only view of a toast for renderers and tests
#[derive(Debug, Clone, PartialEq)]
pub struct ToastSnapshot {
    pub id: ToastId,
    pub text: String,
    pub severity: Severity,
    pub position: Position,
    /// How many times this message was shown while visible
    pub count: u32,
    pub paused: bool,
}

impl ToastSnapshot {
    /// Duplicate counter badge, e.g. `(3)`; absent for a single occurrence
    pub fn badge(&self) -> Option<String> {
        (self.count > 1).then(|| format!("({})", self.count))
    }
}
