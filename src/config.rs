use std::time::Duration;

use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};

use crate::domain::OrderStatus;
use crate::order_actor::SortOrder;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CURRENCY: &str = "VND";

#[derive(Parser, Debug, Clone)]
#[command(name = "order_admin", about = "Back-office order administration", version)]
pub struct CliArgs {
    #[arg(
        long,
        env = "ORDER_ADMIN_BASE_URL",
        value_name = "URL",
        default_value = DEFAULT_BASE_URL,
        help = "Base URL of the order service",
        global = true
    )]
    pub base_url: String,

    #[arg(
        long,
        env = "ORDER_ADMIN_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true,
        help = "Bearer token of the signed-in operator",
        global = true
    )]
    pub token: Option<String>,

    #[arg(
        long,
        env = "ORDER_ADMIN_TIMEOUT_SECS",
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "HTTP request timeout in seconds",
        global = true
    )]
    pub timeout_secs: u64,

    #[arg(
        long,
        env = "ORDER_ADMIN_CURRENCY",
        value_name = "CODE",
        default_value = DEFAULT_CURRENCY,
        help = "Currency suffix used when printing amounts",
        global = true
    )]
    pub currency: String,

    #[arg(long, short = 'y', help = "Answer yes to every confirmation prompt", global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List orders, newest first unless told otherwise
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<OrderStatus>,
        #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
        sort: SortOrder,
    },
    /// Show one order with its items and totals
    Show { id: String },
    /// Move an order to another status
    SetStatus { id: String, status: String },
    /// Confirm a pending order
    Confirm { id: String },
    /// Cancel an order
    Cancel { id: String },
    /// Print the status vocabulary
    Statuses,
}

fn parse_status(raw: &str) -> Result<OrderStatus, String> {
    OrderStatus::parse(raw).ok_or_else(|| format!("unknown status '{}'", raw))
}

/// Settings the admin system is built from.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    pub currency: String,
    pub assume_yes: bool,
}

impl AdminConfig {
    pub fn from_args(args: &CliArgs) -> Self {
        Self {
            base_url: args.base_url.trim().trim_end_matches('/').to_string(),
            token: args
                .token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            timeout: Duration::from_secs(args.timeout_secs),
            currency: args.currency.trim().to_string(),
            assume_yes: args.yes,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.base_url.is_empty(), "base URL must not be empty");
        ensure!(
            self.base_url.starts_with("http://") || self.base_url.starts_with("https://"),
            "base URL must start with http:// or https://, got '{}'",
            self.base_url
        );
        ensure!(!self.timeout.is_zero(), "timeout must be at least one second");
        Ok(())
    }
}
