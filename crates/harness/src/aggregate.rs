//! Run aggregation: counters, timing statistics and the retained result list

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classify::ClassifiedResult;
use crate::registry::TargetCategory;
use crate::rules::RuleSet;

/// Summary of one harness run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub base_url: String,
    /// Number of registered targets when the run started
    pub planned: usize,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub with_optional_feature: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub average_elapsed_millis: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub results: Vec<ClassifiedResult>,
}

impl RunSummary {
    pub fn failed_results(&self) -> impl Iterator<Item = &ClassifiedResult> {
        self.results.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn passed_results(&self) -> impl Iterator<Item = &ClassifiedResult> {
        self.results.iter().filter(|r| !r.outcome.is_failure())
    }

    /// Passed stories without the optional-feature markup
    pub fn missing_optional_feature(&self) -> impl Iterator<Item = &ClassifiedResult> {
        self.results.iter().filter(|r| r.is_missing_optional_feature())
    }

    /// Passed results by ascending load time
    pub fn fastest(&self, n: usize) -> Vec<&ClassifiedResult> {
        let mut passed: Vec<_> = self.passed_results().collect();
        passed.sort_by_key(|r| r.elapsed_millis);
        passed.truncate(n);
        passed
    }

    /// Passed results by descending load time
    pub fn slowest(&self, n: usize) -> Vec<&ClassifiedResult> {
        let mut passed: Vec<_> = self.passed_results().collect();
        passed.sort_by(|a, b| b.elapsed_millis.cmp(&a.elapsed_millis));
        passed.truncate(n);
        passed
    }

    /// Passed results by descending payload size
    pub fn largest(&self, n: usize) -> Vec<&ClassifiedResult> {
        let mut passed: Vec<_> = self.passed_results().collect();
        passed.sort_by(|a, b| b.byte_size.cmp(&a.byte_size));
        passed.truncate(n);
        passed
    }

    pub fn category_counts(&self) -> BTreeMap<TargetCategory, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.results {
            *counts.entry(result.category).or_insert(0) += 1;
        }
        counts
    }

    pub fn total_bytes(&self) -> u64 {
        self.results.iter().map(|r| r.byte_size).sum()
    }

    pub fn total_elapsed_millis(&self) -> u64 {
        self.results.iter().map(|r| r.elapsed_millis).sum()
    }

    pub fn min_elapsed_millis(&self) -> Option<u64> {
        self.results.iter().map(|r| r.elapsed_millis).min()
    }

    pub fn max_elapsed_millis(&self) -> Option<u64> {
        self.results.iter().map(|r| r.elapsed_millis).max()
    }

    /// Percentage of folded results that passed; 0 when nothing ran
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 * 100.0 / self.total as f64
        }
    }

    /// Wall-clock duration of the run, once finished
    pub fn duration_secs(&self) -> Option<i64> {
        self.completed_at.map(|done| (done - self.started_at).num_seconds())
    }
}

/// Folds classified results into a [`RunSummary`]
#[derive(Debug)]
pub struct Aggregator {
    summary: RunSummary,
}

impl Aggregator {
    pub fn new(planned: usize, base_url: impl Into<String>) -> Self {
        Self {
            summary: RunSummary {
                base_url: base_url.into(),
                planned,
                total: 0,
                passed: 0,
                failed: 0,
                with_optional_feature: 0,
                total_errors: 0,
                total_warnings: 0,
                average_elapsed_millis: 0,
                started_at: Utc::now(),
                completed_at: None,
                results: Vec::with_capacity(planned),
            },
        }
    }

    pub fn fold(&mut self, result: ClassifiedResult) {
        let s = &mut self.summary;
        s.total += 1;
        if result.outcome.is_failure() {
            s.failed += 1;
        } else {
            s.passed += 1;
        }
        if result.has_optional_feature_markup && result.category == TargetCategory::Story {
            s.with_optional_feature += 1;
        }
        s.total_errors += result.defects.len();
        s.total_warnings += result.warnings.len();
        s.results.push(result);
    }

    /// Read-only view of the summary so far
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Compute end-of-run statistics and hand back the finished summary
    pub fn finish(self) -> RunSummary {
        let mut summary = self.summary;
        summary.average_elapsed_millis = mean_millis(summary.results.iter().map(|r| r.elapsed_millis));
        summary.completed_at = Some(Utc::now());
        summary
    }
}

/// Rounded arithmetic mean; 0 for an empty input
fn mean_millis(values: impl Iterator<Item = u64>) -> u64 {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0
    } else {
        (sum + count / 2) / count
    }
}

/// Limits used when flagging outliers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Load time above which a target is reported as slow
    pub slow_millis: u64,
    /// Payload size above which a response is reported as large
    pub large_bytes: u64,
    /// Entries per performance table in the report
    pub top_n: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            slow_millis: 5_000,
            large_bytes: 1_000_000,
            top_n: 10,
        }
    }
}

/// Results sharing a hinted defect kind
#[derive(Debug, Clone)]
pub struct FixGroup<'a> {
    pub kind: String,
    pub hint: String,
    pub results: Vec<&'a ClassifiedResult>,
}

/// Post-run analysis of the issues that need attention
#[derive(Debug, Clone)]
pub struct Findings<'a> {
    pub failed: Vec<&'a ClassifiedResult>,
    pub missing_optional_feature: Vec<&'a ClassifiedResult>,
    pub slow: Vec<&'a ClassifiedResult>,
    pub large: Vec<&'a ClassifiedResult>,
    pub immediate_fixes: Vec<FixGroup<'a>>,
}

impl<'a> Findings<'a> {
    pub fn analyze(summary: &'a RunSummary, rules: &RuleSet, thresholds: &Thresholds) -> Self {
        let mut immediate_fixes: Vec<FixGroup<'a>> = Vec::new();
        for rule in rules.defects() {
            let Some(hint) = &rule.hint else { continue };
            let affected: Vec<_> = summary
                .results
                .iter()
                .filter(|r| r.defects.iter().any(|d| d.kind == rule.kind))
                .collect();
            if !affected.is_empty() {
                immediate_fixes.push(FixGroup {
                    kind: rule.kind.clone(),
                    hint: hint.clone(),
                    results: affected,
                });
            }
        }

        Self {
            failed: summary.failed_results().collect(),
            missing_optional_feature: summary.missing_optional_feature().collect(),
            slow: summary
                .results
                .iter()
                .filter(|r| r.elapsed_millis > thresholds.slow_millis)
                .collect(),
            large: summary
                .results
                .iter()
                .filter(|r| r.byte_size > thresholds.large_bytes)
                .collect(),
            immediate_fixes,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.failed.is_empty()
            && self.missing_optional_feature.is_empty()
            && self.slow.is_empty()
            && self.large.is_empty()
    }
}
