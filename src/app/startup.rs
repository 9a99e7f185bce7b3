//! Binary entry: parse, configure, run one storefront command

use crate::app::cli::args::color_hint;
use crate::app::cli::{Args, Command};
use crate::app::config::{apply_overrides, load_settings};
use crate::app::renderer::{TerminalRenderer, RENDERER_ID};
use crate::cart::api::{CartError, CartOutcome};
use crate::core::error_handling::{log_error_with_context, ContextualError};
use crate::core::logging::init_logging;
use crate::core::services::CartServices;
use crate::core::settings::Settings;
use crate::coupon::api::{ApplyContext, CouponError, CouponOutcome};
use crate::notifications::api::{run_subscriber, EventFilter};
use crate::refresh::api::{EnqueueOptions, OperationKind, RefreshError};
use crate::remote::api::WooAjaxClient;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Exit status after Ctrl-C
const INTERRUPTED: u8 = 130;

#[derive(Debug, thiserror::Error)]
pub(crate) enum CommandError {
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Coupon(#[from] CouponError),
    #[error(transparent)]
    Refresh(#[from] RefreshError),
}

impl ContextualError for CommandError {
    fn is_user_actionable(&self) -> bool {
        match self {
            CommandError::Cart(e) => e.is_user_actionable(),
            CommandError::Coupon(e) => e.is_user_actionable(),
            CommandError::Refresh(e) => e.is_user_actionable(),
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            CommandError::Cart(e) => e.user_message(),
            CommandError::Coupon(e) => e.user_message(),
            CommandError::Refresh(e) => e.user_message(),
        }
    }
}

/// What a command left behind once it returned
pub(crate) struct CommandReport {
    pub(crate) succeeded: bool,
    /// Time to keep running for delayed follow-up toasts
    pub(crate) linger: Duration,
}

impl CommandReport {
    fn done(succeeded: bool) -> Self {
        Self {
            succeeded,
            linger: Duration::ZERO,
        }
    }
}

pub async fn startup() -> ExitCode {
    let args = Args::parse_from_env(color_hint());
    let use_color = args.use_color();

    let mut settings = match load_settings(args.config_file.as_deref()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = apply_overrides(&mut settings, &args) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = init_logging(
        settings.logging.level.as_deref(),
        settings.logging.format.as_deref(),
        settings.logging.file.as_deref(),
        use_color,
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }
    log::debug!("cartsync {} starting", crate::core::version::version());

    tokio::select! {
        code = run(settings, args.command, use_color) => code,
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Interrupted");
            ExitCode::from(INTERRUPTED)
        }
    }
}

async fn run(settings: Settings, command: Command, use_color: bool) -> ExitCode {
    let remote = match WooAjaxClient::from_settings(&settings.remote) {
        Ok(client) => client,
        Err(e) => {
            log_error_with_context(&e, "Storefront client setup");
            return ExitCode::FAILURE;
        }
    };
    let services = CartServices::new(settings, Arc::new(remote));

    let receiver = services.notification_manager().await.subscribe(
        RENDERER_ID.to_string(),
        EventFilter::All,
        "cli:renderer".to_string(),
    );
    let renderer = tokio::spawn(run_subscriber(
        receiver,
        Arc::new(TerminalRenderer::stdout(use_color)),
    ));

    let report = match run_command(&services, &command).await {
        Ok(report) => report,
        Err(e) => {
            log_error_with_context(&e, "Command");
            CommandReport::done(false)
        }
    };

    if let Err(e) = services.settled().await {
        log_error_with_context(&e, "Waiting for refresh queue");
    }
    if !report.linger.is_zero() {
        tokio::time::sleep(report.linger).await;
    }

    // Dropping the subscription lets the renderer drain what is left and stop
    if let Err(e) = services.notification_manager().await.unsubscribe(RENDERER_ID) {
        log::debug!("Renderer already detached: {}", e);
    }
    if let Err(e) = renderer.await {
        log::warn!("Renderer task failed: {}", e);
    }

    if report.succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

pub(crate) async fn run_command(
    services: &CartServices,
    command: &Command,
) -> Result<CommandReport, CommandError> {
    log::debug!("Running {:?}", command);
    match command {
        Command::Refresh => {
            services
                .refresh_queue()
                .enqueue(OperationKind::RefreshFragments, EnqueueOptions::default())?;
            services.settled().await?;
            let fragments = services.fragments().snapshot()?;
            log::info!(
                "Refreshed {} fragment(s), cart hash {}",
                fragments.fragments.len(),
                fragments.cart_hash.as_deref().unwrap_or("-")
            );
            Ok(CommandReport::done(true))
        }
        Command::ApplyCoupon { code, checkout } => {
            let context = if *checkout {
                ApplyContext::checkout()
            } else {
                ApplyContext::cart_drawer()
            };
            let outcome = services.coupons().apply(code, context).await?;
            Ok(coupon_report(services, outcome))
        }
        Command::RemoveCoupon { code } => {
            let outcome = services
                .coupons()
                .remove(code, ApplyContext::cart_drawer())
                .await?;
            Ok(coupon_report(services, outcome))
        }
        Command::UpdateQty { key, quantity } => {
            let outcome = services.cart().update_quantity(key, *quantity).await?;
            Ok(cart_report(outcome))
        }
        Command::RemoveItem { key } => {
            let outcome = services.cart().remove_item(key).await?;
            Ok(cart_report(outcome))
        }
        Command::Added { product_id } => {
            services.cart().added_to_cart(product_id)?;
            Ok(CommandReport::done(true))
        }
    }
}

fn coupon_report(services: &CartServices, outcome: CouponOutcome) -> CommandReport {
    log::debug!("Coupon outcome: {:?}", outcome);
    match outcome {
        CouponOutcome::Applied { .. }
        | CouponOutcome::AlreadyApplied { .. }
        | CouponOutcome::Removed { .. } => CommandReport::done(true),
        CouponOutcome::Rejected { reason, .. } if reason.is_usage_limit() => CommandReport {
            succeeded: false,
            linger: services.settings().coupon.follow_up_delay(),
        },
        CouponOutcome::Rejected { .. } | CouponOutcome::InFlight { .. } | CouponOutcome::EmptyCode => {
            CommandReport::done(false)
        }
    }
}

fn cart_report(outcome: CartOutcome) -> CommandReport {
    match outcome {
        CartOutcome::Updated { cart_empty } | CartOutcome::Removed { cart_empty } => {
            if cart_empty {
                log::info!("Cart is now empty");
            }
            CommandReport::done(true)
        }
        CartOutcome::Superseded => CommandReport::done(false),
    }
}
