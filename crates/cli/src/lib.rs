//! docprobe CLI
//!
//! Command-line front end for the documentation regression harness.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{init, rules, run, targets};

/// docprobe - regression sweep for a running documentation server
#[derive(Debug, Parser)]
#[command(name = "docprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format for listings
    #[arg(long, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Probe every target and write the JSON and HTML reports
    Run(run::RunArgs),

    /// List the target registry
    Targets(targets::TargetsArgs),

    /// List the effective defect and warning rules
    Rules(rules::RulesArgs),

    /// Write a default configuration file
    Init(init::InitArgs),
}

/// Dispatch a parsed command line; returns the process exit code
pub async fn execute(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Run(args) => return run::execute(args).await,
        Commands::Targets(args) => targets::execute(args, cli.format)?,
        Commands::Rules(args) => rules::execute(args, cli.format)?,
        Commands::Init(args) => init::execute(args)?,
    }
    Ok(0)
}
