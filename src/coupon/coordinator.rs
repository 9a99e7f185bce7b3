//! Coupon apply/remove coordination

use crate::core::error_handling::user_facing_message;
use crate::core::settings::CouponSettings;
use crate::core::strings::{escape_html, escape_text, normalize_coupon_code};
use crate::coupon::attempts::{AttemptRegistry, Begin};
use crate::coupon::classify::classify;
use crate::coupon::error::{CouponError, CouponResult};
use crate::coupon::types::{
    AppliedCouponsSource, ApplyContext, CheckoutPage, CouponOutcome, SessionCoupons, Surface,
};
use crate::notifications::api::{
    publish_or_log, CouponEvent, CouponEventType, Event, SharedNotificationManager,
};
use crate::refresh::api::{EnqueueOptions, OperationKind, RefreshQueue};
use crate::remote::api::{FormSubmission, RemoteCartService};
use crate::toast::api::{Severity, ToastNotifier, ToastOptions};
use std::collections::BTreeSet;
use std::sync::Arc;

const EMPTY_CODE_MESSAGE: &str = "Please enter a coupon code.";
const NETWORK_ERROR_MESSAGE: &str = "Network error, please try again.";
const APPLY_COUPON_ACTION: &str = "apply_coupon";

/// Where user feedback goes: toasts when wired, inline notices otherwise
#[derive(Clone)]
struct Feedback {
    toasts: Option<ToastNotifier>,
    notifications: SharedNotificationManager,
}

impl Feedback {
    async fn notify(
        &self,
        severity: Severity,
        text: &str,
        code: &str,
        context: &ApplyContext,
    ) {
        match &self.toasts {
            Some(toasts) => {
                if let Err(e) = toasts.show(text, ToastOptions::new(severity)).await {
                    log::warn!("Failed to show coupon toast: {}", e);
                }
            }
            None => {
                let event = CouponEvent::with_message(
                    CouponEventType::InlineNotice,
                    code.to_string(),
                    context.surface,
                    text.to_string(),
                )
                .for_form(context.form_id().map(str::to_string));
                publish_or_log(&self.notifications, Event::Coupon(event)).await;
            }
        }
    }

    async fn publish(&self, event: CouponEvent) {
        publish_or_log(&self.notifications, Event::Coupon(event)).await;
    }
}

/// Serializes coupon attempts per code across the cart drawer and checkout
pub struct CouponCoordinator {
    settings: CouponSettings,
    remote: Arc<dyn RemoteCartService>,
    queue: RefreshQueue,
    feedback: Feedback,
    attempts: Arc<AttemptRegistry>,
    session: Arc<SessionCoupons>,
    sources: Vec<Arc<dyn AppliedCouponsSource>>,
    checkout_page: Option<Arc<dyn CheckoutPage>>,
}

impl CouponCoordinator {
    pub fn new(
        settings: CouponSettings,
        remote: Arc<dyn RemoteCartService>,
        queue: RefreshQueue,
        notifications: SharedNotificationManager,
    ) -> Self {
        let attempts = Arc::new(AttemptRegistry::new(settings.processing_timeout()));
        Self {
            settings,
            remote,
            queue,
            feedback: Feedback {
                toasts: None,
                notifications,
            },
            attempts,
            session: Arc::new(SessionCoupons::new()),
            sources: Vec::new(),
            checkout_page: None,
        }
    }

    pub fn with_toasts(mut self, toasts: ToastNotifier) -> Self {
        self.feedback.toasts = Some(toasts);
        self
    }

    pub fn with_source(mut self, source: Arc<dyn AppliedCouponsSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_checkout_page(mut self, page: Arc<dyn CheckoutPage>) -> Self {
        self.checkout_page = Some(page);
        self
    }

    /// Normalized codes from every source plus this session's changes
    pub fn get_applied_coupons(&self) -> BTreeSet<String> {
        self.sources
            .iter()
            .flat_map(|source| source.applied_codes())
            .chain(self.session.applied_codes())
            .map(|code| normalize_coupon_code(&code))
            .filter(|code| !code.is_empty())
            .collect()
    }

    pub fn is_in_flight(&self, code: &str) -> CouponResult<bool> {
        self.attempts.is_in_flight(&normalize_coupon_code(code))
    }

    pub async fn apply(&self, code: &str, mut context: ApplyContext) -> CouponResult<CouponOutcome> {
        let code = normalize_coupon_code(code);
        if code.is_empty() {
            self.feedback
                .notify(Severity::Warning, EMPTY_CODE_MESSAGE, &code, &context)
                .await;
            context.fail(EMPTY_CODE_MESSAGE);
            return Ok(CouponOutcome::EmptyCode);
        }

        if self.get_applied_coupons().contains(&code) {
            log::debug!("Coupon '{}' already applied, skipping request", code);
            self.feedback
                .publish(CouponEvent::new(
                    CouponEventType::AlreadyApplied,
                    code.clone(),
                    context.surface,
                ))
                .await;
            context.succeed(&format!("Coupon \"{}\" is already applied.", escape_html(&code)));
            return Ok(CouponOutcome::AlreadyApplied { code });
        }

        let generation = match self.attempts.begin(&code)? {
            Begin::Started(generation) => generation,
            Begin::InFlight => {
                log::debug!("Coupon '{}' already being applied, ignoring", code);
                return Ok(CouponOutcome::InFlight { code });
            }
        };
        self.schedule_safety_clear(&code, generation);

        log::debug!("Applying coupon '{}' from {}", code, context.surface);
        let response = match context.surface {
            Surface::CartDrawer => self.remote.apply_coupon(&code).await,
            Surface::Checkout => {
                let form = self.checkout_form(&code);
                self.remote.submit_form(&form).await
            }
        };
        self.attempts.clear(&code, generation)?;

        let raw_message = response.as_ref().ok().and_then(|r| r.message.clone());
        match classify(&code, response) {
            Ok(_) => {
                self.session.insert(&code)?;
                self.enqueue_totals_refresh();

                let message = format!("Coupon \"{}\" applied successfully.", escape_html(&code));
                self.feedback
                    .notify(Severity::Success, &message, &code, &context)
                    .await;
                self.feedback
                    .publish(CouponEvent::new(
                        CouponEventType::Applied,
                        code.clone(),
                        context.surface,
                    ))
                    .await;
                context.succeed(&message);
                Ok(CouponOutcome::Applied { code })
            }
            Err(error) => {
                self.report_failure(&code, &error, raw_message.as_deref(), &mut context)
                    .await;
                if error.is_usage_limit() {
                    self.schedule_usage_limit_follow_up(&code, &context);
                }
                Ok(CouponOutcome::Rejected { code, reason: error })
            }
        }
    }

    pub async fn remove(&self, code: &str, mut context: ApplyContext) -> CouponResult<CouponOutcome> {
        let code = normalize_coupon_code(code);
        if code.is_empty() {
            self.feedback
                .notify(Severity::Warning, EMPTY_CODE_MESSAGE, &code, &context)
                .await;
            context.fail(EMPTY_CODE_MESSAGE);
            return Ok(CouponOutcome::EmptyCode);
        }

        log::debug!("Removing coupon '{}'", code);
        let response = self.remote.remove_coupon(&code).await;
        let raw_message = response.as_ref().ok().and_then(|r| r.message.clone());

        match classify(&code, response) {
            Ok(_) => {
                self.session.remove(&code)?;
                self.enqueue_totals_refresh();

                let message = format!("Coupon \"{}\" removed.", escape_html(&code));
                self.feedback
                    .notify(Severity::Success, &message, &code, &context)
                    .await;
                self.feedback
                    .publish(CouponEvent::new(
                        CouponEventType::Removed,
                        code.clone(),
                        context.surface,
                    ))
                    .await;
                context.succeed(&message);
                Ok(CouponOutcome::Removed { code })
            }
            Err(error) => {
                self.report_failure(&code, &error, raw_message.as_deref(), &mut context)
                    .await;
                Ok(CouponOutcome::Rejected { code, reason: error })
            }
        }
    }

    /// The native checkout form if the page has one, otherwise an
    /// equivalent hidden form
    fn checkout_form(&self, code: &str) -> FormSubmission {
        match self.checkout_page.as_ref().and_then(|page| page.coupon_form()) {
            Some(form) => form.with_field("coupon_code", code),
            None => FormSubmission::new(APPLY_COUPON_ACTION).with_field("coupon_code", code),
        }
    }

    async fn report_failure(
        &self,
        code: &str,
        error: &CouponError,
        raw_message: Option<&str>,
        context: &mut ApplyContext,
    ) {
        // Storefront notices echo the submitted code back
        let text = escape_text(user_facing_message(error, NETWORK_ERROR_MESSAGE));
        match error {
            CouponError::Remote { source, .. } => {
                log::warn!("Coupon request for '{}' failed: {}", code, source)
            }
            _ => log::debug!("Coupon '{}' rejected: {}", code, text),
        }

        self.feedback
            .notify(Severity::Error, &text, code, context)
            .await;
        self.feedback
            .publish(CouponEvent::with_message(
                CouponEventType::Rejected,
                code.to_string(),
                context.surface,
                text,
            ))
            .await;

        let error_text = error.to_string();
        context.fail(raw_message.unwrap_or(error_text.as_str()));
    }

    fn enqueue_totals_refresh(&self) {
        for kind in [OperationKind::UpdateCheckout, OperationKind::RefreshFragments] {
            if let Err(e) = self.queue.enqueue(kind, EnqueueOptions::default()) {
                log::warn!("Failed to queue '{}' after coupon change: {}", kind, e);
            }
        }
    }

    fn schedule_safety_clear(&self, code: &str, generation: u64) {
        let attempts = Arc::clone(&self.attempts);
        let delay = self.settings.clear_delay();
        let code = code.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match attempts.clear(&code, generation) {
                Ok(true) => log::debug!("Safety clear released coupon '{}'", code),
                Ok(false) => {}
                Err(e) => log::warn!("Safety clear for coupon '{}' failed: {}", code, e),
            }
        });
    }

    fn schedule_usage_limit_follow_up(&self, code: &str, context: &ApplyContext) {
        let feedback = self.feedback.clone();
        let delay = self.settings.follow_up_delay();
        let code = code.to_string();
        let follow_up_context = ApplyContext::new(context.surface);
        let follow_up_context = match context.form_id() {
            Some(form) => follow_up_context.form(form),
            None => follow_up_context,
        };
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let text = format!(
                "Please remove the coupon \"{}\" to continue.",
                escape_html(&code)
            );
            feedback
                .notify(Severity::Warning, &text, &code, &follow_up_context)
                .await;
        });
    }
}
