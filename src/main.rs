mod actor_framework;
mod api;
mod app_system;
mod clients;
mod config;
mod context;
mod domain;
mod order_actor;
mod views;

#[cfg(test)]
mod mock_framework;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Instrument};

use crate::app_system::{setup_tracing, AdminSystem, TerminalOperator};
use crate::config::{AdminConfig, CliArgs, Command};
use crate::context::AdminContext;
use crate::domain::OrderStatus;
use crate::views::{OrderDetailView, OrderListView};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    setup_tracing();

    let args = CliArgs::parse();
    let config = AdminConfig::from_args(&args);
    config.validate()?;

    if args.command == Command::Statuses {
        for status in OrderStatus::ALL {
            println!("{:<18} {}", status.as_str(), status.label());
        }
        return Ok(());
    }

    let system = AdminSystem::new(&config).context("failed to start the order client")?;
    let ctx = AdminContext::new(
        system.session().clone(),
        Arc::new(TerminalOperator::new(config.assume_yes)),
    );

    let span = tracing::info_span!("command", command = ?args.command);
    let result = run(args.command, &system, ctx, &config.currency)
        .instrument(span)
        .await;

    system.shutdown().await.map_err(anyhow::Error::msg)?;
    result
}

async fn run(
    command: Command,
    system: &AdminSystem,
    ctx: AdminContext,
    currency: &str,
) -> anyhow::Result<()> {
    let client = system.order_client.clone();
    match command {
        Command::List { status, sort } => {
            let mut view = OrderListView::new(client, ctx);
            view.set_status_filter(status);
            view.set_sort(sort);
            view.refresh().await?;
            print!("{}", view.render(currency));
        }
        Command::Show { id } => {
            let mut view = OrderDetailView::new(client, ctx, id);
            view.load().await?;
            print_detail(&view, currency);
        }
        Command::SetStatus { id, status } => {
            let mut view = OrderDetailView::new(client, ctx, id);
            view.load().await?;
            view.select_status(status);
            view.submit_status().await?;
            print_detail(&view, currency);
        }
        Command::Confirm { id } => {
            let mut view = OrderDetailView::new(client, ctx, id);
            view.load().await?;
            if view.confirm_order().await? {
                print_detail(&view, currency);
            } else {
                info!("Confirmation declined; nothing sent");
            }
        }
        Command::Cancel { id } => {
            let mut view = OrderDetailView::new(client, ctx, id);
            view.load().await?;
            if view.cancel().await? {
                print_detail(&view, currency);
            } else {
                info!("Cancellation declined; nothing sent");
            }
        }
        Command::Statuses => {}
    }
    Ok(())
}

fn print_detail(view: &OrderDetailView, currency: &str) {
    if let Some(rendered) = view.render(currency) {
        print!("{}", rendered);
    }
}
