//! Run orchestration: health check, probe every target, aggregate, report

use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, info, warn};

use crate::aggregate::{Aggregator, Findings, RunSummary};
use crate::classify::{ClassifiedResult, Classifier, Outcome};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::probe::{health_check, probe_target, HttpProbe, Probe};
use crate::registry::TargetRegistry;
use crate::report::{self, RenderOptions, ReportArtifacts};
use crate::rules::RuleSet;

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    HealthChecking,
    Iterating,
    Aggregating,
    Rendering,
    /// Reports written
    Done,
    /// Health check failed; nothing probed, nothing written
    Aborted,
    /// Unexpected failure; partial reports attempted
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Aborted | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::HealthChecking => "health-checking",
            RunState::Iterating => "iterating",
            RunState::Aggregating => "aggregating",
            RunState::Rendering => "rendering",
            RunState::Done => "done",
            RunState::Aborted => "aborted",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What a finished run hands back to its caller
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub state: RunState,
    pub summary: Option<RunSummary>,
    pub artifacts: Option<ReportArtifacts>,
    pub error: Option<String>,
}

impl RunOutcome {
    /// True only for a completed run without failed targets
    pub fn success(&self) -> bool {
        self.state == RunState::Done && self.summary.as_ref().map(|s| s.failed == 0).unwrap_or(false)
    }

    /// Process exit code: 0 on success, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }
}

/// Drives a registry through a probe and produces the reports
pub struct Runner<P: Probe> {
    config: HarnessConfig,
    registry: TargetRegistry,
    classifier: Classifier,
    probe: P,
    state: RunState,
}

impl Runner<HttpProbe> {
    /// Runner with the reqwest-backed probe and the configured rule table
    pub fn from_config(config: HarnessConfig, registry: TargetRegistry) -> HarnessResult<Self> {
        config.validate()?;
        let rules = RuleSet::compile(&config.rules)?;
        let probe = HttpProbe::new(config.timeout())?;
        Ok(Self::new(config, registry, Classifier::new(rules), probe))
    }
}

impl<P: Probe> Runner<P> {
    pub fn new(config: HarnessConfig, registry: TargetRegistry, classifier: Classifier, probe: P) -> Self {
        Self {
            config,
            registry,
            classifier,
            probe,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Execute one complete run. Never returns an error: every failure mode
    /// is reflected in the returned [`RunOutcome`].
    pub async fn run(&mut self) -> RunOutcome {
        self.transition(RunState::HealthChecking);
        if let Err(e) = health_check(&self.probe, &self.config.base_url).await {
            error!("Aborting run: {}", e);
            self.transition(RunState::Aborted);
            return RunOutcome {
                state: RunState::Aborted,
                summary: None,
                artifacts: None,
                error: Some(e.to_string()),
            };
        }

        self.transition(RunState::Iterating);
        info!("Testing {} target(s)...", self.registry.len());

        let mut aggregator = Aggregator::new(self.registry.len(), self.config.base_url.clone());
        let iteration = AssertUnwindSafe(self.iterate(&mut aggregator)).catch_unwind().await;

        let mut failure = match iteration {
            Ok(()) => None,
            Err(panic) => {
                let err = HarnessError::Internal(panic_message(panic.as_ref()));
                error!("Run interrupted after {} target(s): {}", aggregator.summary().total, err);
                self.transition(RunState::Failed);
                Some(err.to_string())
            }
        };

        if failure.is_none() {
            self.transition(RunState::Aggregating);
        }
        let summary = aggregator.finish();
        log_summary(&summary);

        if failure.is_none() {
            self.transition(RunState::Rendering);
        }
        let artifacts = match self.write_reports(&summary) {
            Ok(artifacts) => Some(artifacts),
            Err(e) => {
                error!("Failed to write reports: {}", e);
                self.transition(RunState::Failed);
                failure.get_or_insert(e.to_string());
                None
            }
        };

        log_findings(&Findings::analyze(&summary, self.classifier.rules(), &self.config.thresholds));

        if failure.is_none() {
            self.transition(RunState::Done);
        }

        RunOutcome {
            state: self.state,
            summary: Some(summary),
            artifacts,
            error: failure,
        }
    }

    async fn iterate(&self, aggregator: &mut Aggregator) {
        let total = self.registry.len();
        let throttle = self.config.throttle();

        for (index, target) in self.registry.iter().enumerate() {
            let (url, outcome) = probe_target(&self.probe, &self.config.base_url, target).await;
            let result = self.classifier.classify(target, url, &outcome);
            log_progress(index + 1, total, &result);
            aggregator.fold(result);

            // Constant throttle between probes, not after the last one
            if index + 1 < total && !throttle.is_zero() {
                tokio::time::sleep(throttle).await;
            }
        }
    }

    fn write_reports(&self, summary: &RunSummary) -> HarnessResult<ReportArtifacts> {
        let options = RenderOptions {
            thresholds: self.config.thresholds.clone(),
        };
        let rendered = report::render(summary, &options)?;
        report::write_reports(&rendered, &self.config.report_paths())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn log_progress(index: usize, total: usize, result: &ClassifiedResult) {
    match result.outcome {
        Outcome::Passed => {
            let feature = if result.has_optional_feature_markup { " [feature]" } else { "" };
            info!(
                "[{}/{}] ✓ {} ({} ms){}",
                index, total, result.label, result.elapsed_millis, feature
            );
        }
        Outcome::Failed | Outcome::NetworkError => {
            let reason = result
                .defects
                .first()
                .map(|d| format!("{}: {}", d.kind, d.message))
                .unwrap_or_else(|| "unknown error".to_string());
            error!(
                "[{}/{}] ✗ {} ({} ms) - {}",
                index, total, result.label, result.elapsed_millis, reason
            );
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

fn log_summary(summary: &RunSummary) {
    info!("");
    info!("Summary:");
    info!("  Total: {} of {} planned", summary.total, summary.planned);
    info!("  Passed: {} ({:.1}%)", summary.passed, percent(summary.passed, summary.total));
    info!("  Failed: {} ({:.1}%)", summary.failed, percent(summary.failed, summary.total));
    info!("  With optional feature: {}", summary.with_optional_feature);
    info!("  Errors: {}", summary.total_errors);
    info!("  Warnings: {}", summary.total_warnings);
    info!("  Average load time: {}ms", summary.average_elapsed_millis);
}

fn log_findings(findings: &Findings<'_>) {
    if findings.is_clear() {
        info!("No critical issues found");
        return;
    }

    if !findings.failed.is_empty() {
        warn!("Critical errors ({}):", findings.failed.len());
        for (i, result) in findings.failed.iter().enumerate() {
            warn!("  {}. {}", i + 1, result.label);
            for defect in &result.defects {
                warn!("     - {}: {}", defect.kind, defect.message);
            }
        }
    }

    if !findings.missing_optional_feature.is_empty() {
        warn!("Stories missing the optional feature ({}):", findings.missing_optional_feature.len());
        for (i, result) in findings.missing_optional_feature.iter().enumerate() {
            warn!("  {}. {} ({})", i + 1, result.label, result.address);
        }
    }

    if !findings.slow.is_empty() {
        warn!("Slow load times ({}):", findings.slow.len());
        for (i, result) in findings.slow.iter().enumerate() {
            warn!("  {}. {}: {}ms", i + 1, result.label, result.elapsed_millis);
        }
    }

    if !findings.large.is_empty() {
        warn!("Large responses ({}):", findings.large.len());
        for (i, result) in findings.large.iter().enumerate() {
            warn!(
                "  {}. {}: {:.2}MB",
                i + 1,
                result.label,
                result.byte_size as f64 / 1024.0 / 1024.0
            );
        }
    }

    for group in &findings.immediate_fixes {
        warn!("Immediate fix needed - {}: {} target(s)", group.kind, group.results.len());
        warn!("  {}", group.hint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(RunState::Done.is_terminal());
        assert!(RunState::Aborted.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::Iterating.is_terminal());
    }

    #[test]
    fn test_exit_code_requires_done_and_no_failures() {
        let aborted = RunOutcome {
            state: RunState::Aborted,
            summary: None,
            artifacts: None,
            error: Some("unhealthy".to_string()),
        };
        assert_eq!(aborted.exit_code(), 1);

        let mut summary = Aggregator::new(0, "http://x").finish();
        let done = RunOutcome {
            state: RunState::Done,
            summary: Some(summary.clone()),
            artifacts: None,
            error: None,
        };
        assert_eq!(done.exit_code(), 0);

        summary.failed = 1;
        let failed = RunOutcome {
            state: RunState::Done,
            summary: Some(summary),
            artifacts: None,
            error: None,
        };
        assert_eq!(failed.exit_code(), 1);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
