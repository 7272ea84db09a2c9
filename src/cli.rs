// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_TIMEOUT_SECS;

#[derive(Parser, Debug)]
#[command(author, version, about = "Passive reconnaissance of a single website", long_about = None)]
pub struct Args {
    /// Absolute URL of the site to inspect, e.g. https://example.com
    pub url: String,

    /// Time budget per probe, in seconds (at least 1)
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// JSON file of technology keywords replacing the built-in vocabulary
    #[arg(long, value_name = "PATH")]
    pub vocabulary: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Mirror log output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
