// Declare modules
pub mod cli;
pub mod config;
pub mod invoker;
pub mod models;
pub mod report;
pub mod walker;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::Path;
use std::time::Instant;

use self::cli::Cli;
use self::config::load_config;
use self::invoker::{CommandInvoker, TestInvoker};
use self::models::RunConfig;
use self::report::{
    display_report_path, format_run_time, write_report, Summary, REPORT_NAME,
};
use self::walker::walk;

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    let start = Instant::now();

    // 1. Parse Args
    let args = Cli::parse();

    // 2. Load Configuration
    let config = load_config(&args.config)?;
    log::info!(
        "Searching {} to depth {}",
        config.base_path.display(),
        config.search_depth
    );

    // 3. Walk, Test and Report
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let mut invoker = CommandInvoker::new(&config.test_command)?;
    let summary = execute(&config, &mut invoker, &current_dir)?;
    log::debug!("Final counts: {:?}", summary);

    // 4. Print Location and Timing
    println!(
        "Report file path:  {}",
        display_report_path(&config.base_path).display()
    );
    println!("Run time:  {}", format_run_time(start.elapsed()));

    Ok(())
}

/// Walks the tree, writes the report into `report_dir` and prints the summary.
pub fn execute<I: TestInvoker>(
    config: &RunConfig,
    invoker: &mut I,
    report_dir: &Path,
) -> Result<Summary> {
    let state = walk(config, invoker)?;
    let summary = Summary::from_state(&state);

    println!("{}", summary);

    write_report(report_dir, &state, &summary)?;
    Ok(summary)
}
