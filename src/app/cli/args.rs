//! Command line arguments
//!
//! Global flags override the matching configuration file values; the
//! subcommand names the storefront action to run.

use crate::core::styles::palette_to_clap;
use crate::core::version::long_version;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "cartsync")]
#[command(about = "Cart and coupon refresh coordination for WooCommerce storefronts")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Storefront root URL (e.g. https://shop.example.com)
    #[arg(short = 'u', long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<String>,

    /// Force colored output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch fresh cart fragments
    Refresh,

    /// Apply a coupon code
    ApplyCoupon {
        code: String,
        /// Submit through the checkout coupon form instead of the cart drawer
        #[arg(long)]
        checkout: bool,
    },

    /// Remove a coupon code
    RemoveCoupon { code: String },

    /// Change the quantity of a cart item (0 removes it)
    UpdateQty {
        key: String,
        #[arg(value_name = "QTY")]
        quantity: u32,
    },

    /// Remove a cart item
    RemoveItem { key: String },

    /// Announce a product added to the cart elsewhere
    Added {
        #[arg(value_name = "PRODUCT_ID")]
        product_id: String,
    },
}

impl Args {
    /// Parse from the process arguments, exiting on `--help`/`--version`/errors
    pub fn parse_from_env(use_color: bool) -> Self {
        Self::parse_with_styles(std::env::args_os(), use_color)
            .unwrap_or_else(|e| e.exit())
    }

    pub fn parse_with_styles<I, T>(args: I, use_color: bool) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let command = Self::command()
            .long_version(long_version())
            .styles(palette_to_clap(use_color));
        let mut matches = command.try_get_matches_from(args)?;
        Self::from_arg_matches_mut(&mut matches)
    }

    /// Resolve whether terminal output should be coloured
    ///
    /// Explicit flags win; otherwise colour follows whether stdout is a terminal.
    pub fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        self.color || std::io::IsTerminal::is_terminal(&std::io::stdout())
    }
}

/// Colour hint for the help screen, before arguments are parsed
pub fn color_hint() -> bool {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--no-color") {
        return false;
    }
    args.iter().any(|a| a == "--color") || std::io::IsTerminal::is_terminal(&std::io::stdout())
}
