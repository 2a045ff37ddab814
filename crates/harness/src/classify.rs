//! Response classification: turns a raw probe outcome into a verdict

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::probe::ProbeOutcome;
use crate::registry::{TargetCategory, TargetDescriptor};
use crate::rules::{RuleSet, Severity};

pub const NETWORK_ERROR_KIND: &str = "network_error";
pub const HTTP_ERROR_KIND: &str = "http_error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    NetworkError,
}

impl Outcome {
    /// Both `Failed` and `NetworkError` count as failures
    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Passed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::NetworkError => "network_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defect {
    pub kind: String,
    pub message: String,
    pub severity: Severity,
    /// Source of the matched rule, when a content rule fired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: String,
    pub message: String,
}

/// Annotated verdict for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedResult {
    pub id: u32,
    pub address: String,
    pub label: String,
    pub category: TargetCategory,
    pub expects_optional_feature: bool,
    pub url: String,
    pub http_status: Option<u16>,
    pub elapsed_millis: u64,
    pub byte_size: u64,
    pub outcome: Outcome,
    pub defects: Vec<Defect>,
    pub warnings: Vec<Warning>,
    pub has_expected_markup: bool,
    pub has_optional_feature_markup: bool,
    pub observed_at: DateTime<Utc>,
}

impl ClassifiedResult {
    fn new(target: &TargetDescriptor, url: String, outcome: &ProbeOutcome) -> Self {
        Self {
            id: target.id,
            address: target.address.clone(),
            label: target.label.clone(),
            category: target.category,
            expects_optional_feature: target.expects_optional_feature,
            url,
            http_status: outcome.http_status,
            elapsed_millis: outcome.elapsed_millis,
            byte_size: outcome.byte_size,
            outcome: Outcome::Passed,
            defects: Vec::new(),
            warnings: Vec::new(),
            has_expected_markup: false,
            has_optional_feature_markup: false,
            observed_at: Utc::now(),
        }
    }

    /// A passed story whose page lacks the optional-feature markup
    pub fn is_missing_optional_feature(&self) -> bool {
        self.category == TargetCategory::Story
            && self.outcome == Outcome::Passed
            && !self.has_optional_feature_markup
    }
}

/// Applies a [`RuleSet`] to probe outcomes
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleSet,
}

impl Classifier {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn classify(&self, target: &TargetDescriptor, url: impl Into<String>, outcome: &ProbeOutcome) -> ClassifiedResult {
        let mut result = ClassifiedResult::new(target, url.into(), outcome);

        if let Some(err) = &outcome.network_error {
            result.outcome = Outcome::NetworkError;
            result.defects.push(Defect {
                kind: NETWORK_ERROR_KIND.to_string(),
                message: err.clone(),
                severity: Severity::High,
                pattern: None,
            });
            return result;
        }

        match outcome.http_status {
            Some(200) => {}
            status => {
                let status = status.map(|s| s.to_string()).unwrap_or_else(|| "N/A".to_string());
                result.outcome = Outcome::Failed;
                result.defects.push(Defect {
                    kind: HTTP_ERROR_KIND.to_string(),
                    message: format!("HTTP {}", status),
                    severity: Severity::High,
                    pattern: None,
                });
                return result;
            }
        }

        let body = outcome.body.as_str();

        if let Some(rule) = self.rules.first_defect(body) {
            result.outcome = Outcome::Failed;
            result.defects.push(Defect {
                kind: rule.kind.clone(),
                message: format!("Detected error pattern: {}", rule.pattern.as_str()),
                severity: rule.severity,
                pattern: Some(format!("/{}/", rule.pattern.as_str())),
            });
        }

        result.warnings.extend(self.rules.matching_warnings(body).map(|rule| Warning {
            kind: rule.kind.clone(),
            message: format!("Warning pattern detected: {}", rule.pattern.as_str()),
        }));

        result.has_expected_markup = self.rules.has_expected_markup(body);
        result.has_optional_feature_markup = self.rules.has_optional_feature_markup(body);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn classifier() -> Classifier {
        Classifier::new(RuleSet::builtin().unwrap())
    }

    fn story() -> TargetDescriptor {
        TargetDescriptor {
            id: 1,
            address: "/?path=/story/button--primary".to_string(),
            label: "Button - Primary".to_string(),
            category: TargetCategory::Story,
            expects_optional_feature: true,
        }
    }

    fn classify_body(body: &str) -> ClassifiedResult {
        classifier().classify(&story(), "http://x/", &ProbeOutcome::response(200, body, 10))
    }

    #[test]
    fn test_clean_page_passes() {
        let result = classify_body(r#"<div id="storybook-root"></div><div class="code-variants"></div>"#);
        assert_eq!(result.outcome, Outcome::Passed);
        assert!(result.defects.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.has_expected_markup);
        assert!(result.has_optional_feature_markup);
        assert!(!result.is_missing_optional_feature());
    }

    #[test_case("Cannot destructure property 'content' of 'undefined'", "destructure_undefined" ; "destructure")]
    #[test_case("ReferenceError: foo is not defined", "reference_error" ; "reference")]
    #[test_case("TypeError: Cannot read properties of undefined", "type_error" ; "type error")]
    #[test_case("TypeError: render is not a function", "function_error" ; "not a function")]
    #[test_case("Error: Module build failed (from babel-loader)", "build_error" ; "build")]
    #[test_case("SyntaxError: Unexpected token '<'", "syntax_error" ; "syntax")]
    #[test_case("RangeError: Maximum call stack size exceeded", "stack_overflow" ; "stack")]
    #[test_case("CircleTickIcon is not defined", "missing_icon_import" ; "icon")]
    #[test_case("Tooltip is not defined", "missing_tooltip_import" ; "tooltip")]
    fn test_defect_rule_detects(body: &str, kind: &str) {
        let result = classify_body(body);
        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.defects.len(), 1);
        assert_eq!(result.defects[0].kind, kind);
        assert!(result.defects[0].pattern.is_some());
    }

    #[test]
    fn test_first_match_wins() {
        let body = "SyntaxError: Unexpected token\nRangeError: Maximum call stack size exceeded\nError: Module build failed";
        let result = classify_body(body);
        assert_eq!(result.defects.len(), 1);
        assert_eq!(result.defects[0].kind, "build_error");
    }

    #[test]
    fn test_all_warnings_recorded_and_outcome_unchanged() {
        let body = "Warning: Each child should have a key. Deprecated: old api. Failed prop type: bad";
        let result = classify_body(body);
        assert_eq!(result.outcome, Outcome::Passed);
        let kinds: Vec<&str> = result.warnings.iter().map(|w| w.kind.as_str()).collect();
        assert_eq!(kinds, vec!["framework_warning", "deprecation_warning", "prop_type_warning"]);
    }

    #[test]
    fn test_annotations_still_run_after_defect() {
        let body = r#"<div id="storybook-root"></div> codeVariants ReferenceError: x is not defined Warning: y"#;
        let result = classify_body(body);
        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.has_expected_markup);
        assert!(result.has_optional_feature_markup);
    }

    #[test]
    fn test_non_200_is_http_error() {
        let result = classifier().classify(
            &story(),
            "http://x/",
            &ProbeOutcome::response(404, "Warning: not found", 5),
        );
        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.defects.len(), 1);
        assert_eq!(result.defects[0].kind, HTTP_ERROR_KIND);
        assert!(result.defects[0].message.contains("404"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_network_error() {
        let result = classifier().classify(
            &story(),
            "http://x/",
            &ProbeOutcome::network_failure("connection refused", 7),
        );
        assert_eq!(result.outcome, Outcome::NetworkError);
        assert!(result.outcome.is_failure());
        assert_eq!(result.defects[0].kind, NETWORK_ERROR_KIND);
        assert_eq!(result.defects[0].message, "connection refused");
        assert_eq!(result.defects[0].severity, Severity::High);
    }

    #[test]
    fn test_missing_feature_only_for_stories() {
        let mut doc = story();
        doc.category = TargetCategory::Doc;
        let result = classifier().classify(&doc, "http://x/", &ProbeOutcome::response(200, "<html>", 1));
        assert_eq!(result.outcome, Outcome::Passed);
        assert!(!result.is_missing_optional_feature());

        let result = classify_body("<html>");
        assert!(result.is_missing_optional_feature());
    }

    #[test]
    fn test_pass_iff_clean() {
        let c = classifier();
        let cases = [
            ProbeOutcome::response(200, "ok", 1),
            ProbeOutcome::response(200, "SyntaxError: Unexpected token", 1),
            ProbeOutcome::response(500, "ok", 1),
            ProbeOutcome::network_failure("timeout", 1),
        ];
        for outcome in &cases {
            let result = c.classify(&story(), "http://x/", outcome);
            let clean = outcome.http_status == Some(200)
                && outcome.network_error.is_none()
                && c.rules().first_defect(&outcome.body).is_none();
            assert_eq!(result.outcome == Outcome::Passed, clean);
            assert_eq!(result.outcome.is_failure(), !result.defects.is_empty());
        }
    }
}
