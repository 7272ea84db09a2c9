// src/main.rs

use clap::Parser;
use color_eyre::eyre::Result;
use std::io::{stdout, IsTerminal, Write};
use std::process::ExitCode;
use tracing::{error, info};

mod cli;
mod config;
mod core;
mod logging;
mod ui;

use cli::Args;
use config::ReconConfig;
use crate::core::scanner::{Collaborators, ReconScanner};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let args = Args::parse();
    let log_path = logging::initialize_logging(args.verbose)?;
    info!(log = %log_path.display(), "Logging initialized.");

    let config = ReconConfig::load(args.timeout, args.vocabulary.as_deref())?;
    let collaborators = Collaborators::production(&config)?;

    // A bad target is rejected before any probe runs.
    let report = match ReconScanner::new(collaborators, &config).run(&args.url).await {
        Ok(report) => report,
        Err(e) => {
            error!(url = %args.url, error = %e, "Rejected target.");
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut out = stdout().lock();
    if args.json {
        ui::render_json(&report, &mut out)?;
    } else {
        let styled = out.is_terminal();
        ui::render_report(&report, &mut out, styled)?;
    }
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}
