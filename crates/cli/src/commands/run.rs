//! Run Command

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

use docprobe_harness::{default_registry, HarnessConfig, RunState, Runner, TargetCategory};

use super::config_path;
use crate::output::{print_error, print_success, print_warning};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Root URL of the documentation server
    #[arg(long, env = "DOCPROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Configuration file (defaults to ./docprobe.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the JSON and HTML reports
    #[arg(short, long, env = "DOCPROBE_OUTPUT_DIR")]
    pub output: Option<PathBuf>,

    /// Pause between probes in milliseconds
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Only probe one category (doc or story)
    #[arg(long)]
    pub only: Option<TargetCategory>,
}

impl RunArgs {
    /// Load the config file and apply flag overrides on top
    pub fn resolve_config(&self) -> Result<HarnessConfig> {
        let path = config_path(self.config.as_deref());
        let mut config = HarnessConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(throttle_ms) = self.throttle_ms {
            config.throttle_ms = throttle_ms;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Execute a full run; returns the process exit code
pub async fn execute(args: RunArgs) -> Result<i32> {
    let config = args.resolve_config()?;
    debug!("Effective configuration: {:?}", config);

    let mut registry = default_registry();
    if let Some(category) = args.only {
        registry = registry.only(category);
    }

    let mut runner = Runner::from_config(config, registry)?;
    let outcome = runner.run().await;

    match outcome.state {
        RunState::Done => {
            if let Some(summary) = &outcome.summary {
                if summary.failed == 0 {
                    print_success(&format!("All {} target(s) passed", summary.total));
                } else {
                    print_warning(&format!("{} of {} target(s) failed", summary.failed, summary.total));
                }
            }
        }
        RunState::Aborted => {
            print_error(&format!(
                "Run aborted: {}",
                outcome.error.as_deref().unwrap_or("health check failed")
            ));
        }
        _ => {
            print_error(&format!(
                "Run failed: {}",
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    if let Some(artifacts) = &outcome.artifacts {
        println!("  JSON report: {}", artifacts.json.display());
        println!("  HTML report: {}", artifacts.html.display());
    }

    Ok(outcome.exit_code())
}
