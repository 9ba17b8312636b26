//! Blackoutbox - Main Entry Point
//!
//! Composition root: configuration, logging, wiring, and the operator CLI.

mod cli;
mod commands;
mod config;
mod logging;
mod telemetry;
mod wiring;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Settings;
use tracing::info;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let settings = Settings::load(cli.config.as_deref())?;

    // 2. Initialize logging
    let logging = logging::init_logging(&settings.logging)?;
    info!("Blackoutbox v{} starting...", VERSION);

    // 3. Wire dependencies and dispatch
    let result = dispatch(cli.command, settings).await;

    logging.shutdown();
    result
}

async fn dispatch(command: Commands, settings: Settings) -> Result<()> {
    let app = wiring::build_app(settings).await?;

    match command {
        Commands::Run => commands::run(app).await,
        Commands::CheckTriggers => commands::check_triggers(&app).await,
        Commands::CheckStuck { threshold_secs } => commands::check_stuck(&app, threshold_secs).await,
        Commands::Print {
            document_id,
            file_path,
        } => commands::print(&app, document_id, &file_path).await,
        Commands::JobStatus { job_id } => commands::job_status(&app, job_id).await,
        Commands::Jobs { stuck_after_secs } => commands::jobs(&app, stuck_after_secs).await,
        Commands::Triggers(command) => commands::triggers(&app, command).await,
        Commands::Documents(command) => commands::documents(&app, command).await,
        Commands::Templates(command) => commands::templates(&app, command).await,
    }
}
