//! Init Command

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use docprobe_harness::HarnessConfig;

use super::DEFAULT_CONFIG_FILE;
use crate::output::print_success;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Where to write the configuration file
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Write the default configuration, including the built-in rule table
pub fn execute(args: InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.path.display());
    }
    HarnessConfig::default().save(&args.path)?;
    print_success(&format!("Wrote default configuration to {}", args.path.display()));
    Ok(())
}
