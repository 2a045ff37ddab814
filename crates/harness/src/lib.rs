//! docprobe regression harness
//!
//! Probes every page of a running documentation server over plain HTTP,
//! classifies each response against a data-driven rule table, and writes a
//! JSON and an HTML report.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Runner                              │
//! │   Idle → HealthChecking → Iterating → Aggregating →         │
//! │          Rendering → Done        (or Aborted / Failed)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TargetRegistry ──► Probe ──► Classifier ──► Aggregator     │
//! │   (fixed list)     (GET)     (RuleSet)      (RunSummary)    │
//! │                                                  │          │
//! │                                     report::render ──► JSON │
//! │                                                    └─► HTML │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use docprobe_harness::{default_registry, HarnessConfig, Runner};
//!
//! # async fn run() -> docprobe_harness::HarnessResult<()> {
//! let mut runner = Runner::from_config(HarnessConfig::default(), default_registry())?;
//! let outcome = runner.run().await;
//! std::process::exit(outcome.exit_code());
//! # }
//! ```

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod probe;
pub mod registry;
pub mod report;
pub mod rules;
pub mod runner;

pub use aggregate::{Aggregator, Findings, RunSummary, Thresholds};
pub use classify::{ClassifiedResult, Classifier, Defect, Outcome, Warning};
pub use config::{HarnessConfig, ReportPaths};
pub use error::{HarnessError, HarnessResult};
pub use probe::{health_check, probe_target, HttpProbe, Probe, ProbeOutcome};
pub use registry::{default_registry, TargetCategory, TargetDescriptor, TargetRegistry};
pub use report::{render, write_reports, RenderOptions, RenderedReport, ReportArtifacts};
pub use rules::{RuleSet, RuleTable, Severity};
pub use runner::{RunOutcome, RunState, Runner};
