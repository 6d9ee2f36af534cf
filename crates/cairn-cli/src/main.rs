//! Cairn CLI Application
//!
//! Command-line front end for the cairn plan lifecycle engine.

mod args;
mod cli;
mod handlers;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use cairn_core::{CancellationToken, PlannerBuilder};
use clap::Parser;
use handlers::Cli;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        data_dir,
        project,
        strict_approval,
        no_color,
        command,
    } = Args::parse();

    let mut builder = PlannerBuilder::new().with_approval_bypass(!strict_approval);
    if let Some(data_dir) = data_dir {
        builder = builder.with_data_dir(data_dir);
    }
    if let Some(project) = project {
        builder = builder.with_project(project);
    }
    let planner = builder
        .build()
        .await
        .context("Failed to initialize planner")?;
    info!("cairn started with data dir {}", planner.data_dir().display());

    // Ctrl+C cancels the running operation before it commits.
    let ctx = CancellationToken::new();
    let signal_ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            signal_ctx.cancel();
        }
    });

    let cli = Cli::new(planner, TerminalRenderer::new(!no_color), ctx);
    match command {
        Some(Plan { command }) => cli.handle_plan_command(command).await,
        Some(Task { command }) => cli.handle_task_command(command).await,
        Some(Phase { command }) => cli.handle_phase_command(command).await,
        None => cli.list_plans().await,
    }
}
