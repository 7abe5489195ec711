// Path: crates/jam-cli/src/main.rs

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # jam-cli
//!
//! Runs the accumulation engine over a JSON test vector and prints the
//! resulting accumulate root and per-service stats.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jam_cli::run_vector;

#[derive(Parser, Debug)]
#[command(name = "jam-cli", version, about = "Accumulation engine test-vector runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Loads a JSON test vector and runs it through the accumulation engine.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Path to the test-vector JSON file.
    vector: PathBuf,
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.vector)
        .with_context(|| format!("reading test vector {}", args.vector.display()))?;
    let report = run_vector(&raw)?;

    println!("accumulate_root: 0x{}", hex::encode(report.accumulate_root));
    println!("invoked_services: {:?}", report.invoked_services);
    for (id, summary) in &report.services {
        println!(
            "  service {id}: accumulated_count={} gas_used={} balance={}",
            summary.accumulated_count, summary.gas_used, summary.balance
        );
    }
    Ok(())
}
