//! Terminal rendering of toasts and inline coupon notices

use crate::core::styles::StyleRole;
use crate::notifications::api::{
    CouponEvent, CouponEventType, Event, Subscriber, ToastEvent, ToastEventType,
};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

pub const RENDERER_ID: &str = "terminal-renderer";

/// Draws each shown toast as one line on the terminal
pub struct TerminalRenderer {
    use_color: bool,
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalRenderer {
    pub fn stdout(use_color: bool) -> Self {
        Self::with_writer(use_color, Box::new(std::io::stdout()))
    }

    pub fn with_writer(use_color: bool, out: Box<dyn Write + Send>) -> Self {
        Self {
            use_color,
            out: Mutex::new(out),
        }
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| std::io::Error::other("renderer output lock poisoned"))?;
        writeln!(out, "{}", line)?;
        out.flush()
    }
}

/// Text for a toast event, or `None` if it changes nothing on screen
pub fn format_toast(event: &ToastEvent, use_color: bool) -> Option<String> {
    let toast = &event.toast;
    match event.event_type {
        ToastEventType::Shown | ToastEventType::Updated => {}
        ToastEventType::Queued | ToastEventType::Dismissed => return None,
    }

    let role = StyleRole::from(toast.severity);
    let label = role.paint(&format!("[{}]", toast.severity), use_color);
    let mut line = format!("{} {}", label, toast.text);
    if let Some(badge) = toast.badge() {
        line.push(' ');
        line.push_str(&StyleRole::Badge.paint(&badge, use_color));
    }
    Some(line)
}

/// Inline notices stand in for toasts when no toaster is wired
pub fn format_inline_notice(event: &CouponEvent, use_color: bool) -> Option<String> {
    if event.event_type != CouponEventType::InlineNotice {
        return None;
    }
    let message = event.message.as_deref()?;
    let target = event.form.as_deref().unwrap_or(event.surface.as_ref());
    Some(format!(
        "{} {}",
        StyleRole::Dim.paint(&format!("[{}]", target), use_color),
        message
    ))
}

#[async_trait]
impl Subscriber for TerminalRenderer {
    async fn handle_event(&self, event: Event) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let line = match &event {
            Event::Toast(toast) => format_toast(toast, self.use_color),
            Event::Coupon(coupon) => format_inline_notice(coupon, self.use_color),
            Event::Cart(cart) => {
                log::debug!("Cart signal: {}", cart.signal.kind());
                None
            }
        };
        if let Some(line) = line {
            self.write_line(&line)?;
        }
        Ok(())
    }

    fn subscriber_id(&self) -> &str {
        RENDERER_ID
    }
}
