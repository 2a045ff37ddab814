//! Rule tables used by the classifier
//!
//! Rules are plain data: a [`RuleTable`] can be loaded from the harness
//! config, and [`RuleSet::compile`] turns it into compiled regexes. The
//! classifier never hardcodes a signature; adding one means adding a row.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Serializable description of a defect rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectRuleSpec {
    pub kind: String,
    pub pattern: String,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    /// Remediation note surfaced in the "immediate fixes" analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

fn default_severity() -> Severity {
    Severity::High
}

/// Serializable description of a warning rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRuleSpec {
    pub kind: String,
    pub pattern: String,
}

/// The full, uncompiled rule configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTable {
    /// Substrings showing the app mounted
    pub expected_markers: Vec<String>,

    /// Substrings showing the optional feature is present
    pub optional_feature_markers: Vec<String>,

    /// Checked in order; the first match wins
    pub defects: Vec<DefectRuleSpec>,

    /// Checked in order; every match is recorded
    pub warnings: Vec<WarningRuleSpec>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            expected_markers: strings(&[
                r#"id="storybook-root""#,
                r#"id="storybook-preview-wrapper""#,
                r#"class="sb-preview-main""#,
                r#"class="sb-show-main""#,
            ]),
            optional_feature_markers: strings(&[
                "code-variants",
                "codeVariants",
                r#"data-testid="code-variants""#,
                r#"class="code-variants""#,
                "storybook-addon-code-variants",
            ]),
            defects: default_defect_rules(),
            warnings: default_warning_rules(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn defect(kind: &str, pattern: &str, hint: Option<&str>) -> DefectRuleSpec {
    DefectRuleSpec {
        kind: kind.to_string(),
        pattern: pattern.to_string(),
        severity: Severity::High,
        hint: hint.map(str::to_string),
    }
}

pub fn default_defect_rules() -> Vec<DefectRuleSpec> {
    vec![
        defect(
            "destructure_undefined",
            r"Cannot destructure property 'content' of 'undefined'",
            Some("A component destructures props that are not passed; check its default props."),
        ),
        defect("reference_error", r"ReferenceError: (\w+) is not defined", None),
        defect(
            "type_error",
            r"TypeError: Cannot read propert(y|ies) of (undefined|null)",
            None,
        ),
        defect("function_error", r"TypeError: (\w+) is not a function", None),
        defect("build_error", r"Error: Module build failed", None),
        defect("syntax_error", r"SyntaxError: Unexpected token", None),
        defect("stack_overflow", r"RangeError: Maximum call stack size exceeded", None),
        defect(
            "missing_icon_import",
            r"CircleTickIcon is not defined",
            Some("An icon is used without being imported."),
        ),
        defect(
            "missing_tooltip_import",
            r"Tooltip is not defined",
            Some("The Tooltip component is used without being imported."),
        ),
    ]
}

pub fn default_warning_rules() -> Vec<WarningRuleSpec> {
    [
        ("framework_warning", r"Warning: "),
        ("deprecation_warning", r"Deprecated:"),
        ("prop_type_warning", r"Failed prop type:"),
    ]
    .into_iter()
    .map(|(kind, pattern)| WarningRuleSpec {
        kind: kind.to_string(),
        pattern: pattern.to_string(),
    })
    .collect()
}

/// A compiled defect rule
#[derive(Debug, Clone)]
pub struct DefectRule {
    pub kind: String,
    pub pattern: Regex,
    pub severity: Severity,
    pub hint: Option<String>,
}

/// A compiled warning rule
#[derive(Debug, Clone)]
pub struct WarningRule {
    pub kind: String,
    pub pattern: Regex,
}

/// Compiled rules, ready for matching
#[derive(Debug, Clone)]
pub struct RuleSet {
    defects: Vec<DefectRule>,
    warnings: Vec<WarningRule>,
    expected_markers: Vec<String>,
    optional_feature_markers: Vec<String>,
}

fn compile_pattern(kind: &str, pattern: &str) -> HarnessResult<Regex> {
    Regex::new(pattern).map_err(|source| HarnessError::InvalidRule {
        kind: kind.to_string(),
        source,
    })
}

impl RuleSet {
    pub fn compile(table: &RuleTable) -> HarnessResult<Self> {
        let defects = table
            .defects
            .iter()
            .map(|spec| {
                Ok(DefectRule {
                    kind: spec.kind.clone(),
                    pattern: compile_pattern(&spec.kind, &spec.pattern)?,
                    severity: spec.severity,
                    hint: spec.hint.clone(),
                })
            })
            .collect::<HarnessResult<Vec<_>>>()?;

        let warnings = table
            .warnings
            .iter()
            .map(|spec| {
                Ok(WarningRule {
                    kind: spec.kind.clone(),
                    pattern: compile_pattern(&spec.kind, &spec.pattern)?,
                })
            })
            .collect::<HarnessResult<Vec<_>>>()?;

        Ok(Self {
            defects,
            warnings,
            expected_markers: table.expected_markers.clone(),
            optional_feature_markers: table.optional_feature_markers.clone(),
        })
    }

    /// Compiled built-in rules
    pub fn builtin() -> HarnessResult<Self> {
        Self::compile(&RuleTable::default())
    }

    pub fn defects(&self) -> &[DefectRule] {
        &self.defects
    }

    pub fn warnings(&self) -> &[WarningRule] {
        &self.warnings
    }

    /// First defect rule matching `body`, in table order
    pub fn first_defect(&self, body: &str) -> Option<&DefectRule> {
        self.defects.iter().find(|rule| rule.pattern.is_match(body))
    }

    /// Every warning rule matching `body`, in table order
    pub fn matching_warnings<'a>(&'a self, body: &'a str) -> impl Iterator<Item = &'a WarningRule> + 'a {
        self.warnings.iter().filter(move |rule| rule.pattern.is_match(body))
    }

    pub fn has_expected_markup(&self, body: &str) -> bool {
        self.expected_markers.iter().any(|m| body.contains(m.as_str()))
    }

    pub fn has_optional_feature_markup(&self, body: &str) -> bool {
        self.optional_feature_markers.iter().any(|m| body.contains(m.as_str()))
    }

    /// Hint for a defect kind, if its rule carries one
    pub fn hint_for(&self, kind: &str) -> Option<&str> {
        self.defects
            .iter()
            .find(|rule| rule.kind == kind)
            .and_then(|rule| rule.hint.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_compile_in_order() {
        let rules = RuleSet::builtin().unwrap();
        let kinds: Vec<&str> = rules.defects().iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "destructure_undefined",
                "reference_error",
                "type_error",
                "function_error",
                "build_error",
                "syntax_error",
                "stack_overflow",
                "missing_icon_import",
                "missing_tooltip_import",
            ]
        );
        assert_eq!(rules.warnings().len(), 3);
    }

    #[test]
    fn test_first_defect_respects_table_order() {
        let rules = RuleSet::builtin().unwrap();
        // Matches both reference_error and missing_tooltip_import
        let body = "Uncaught ReferenceError: Tooltip is not defined";
        assert_eq!(rules.first_defect(body).unwrap().kind, "reference_error");

        let body = "Tooltip is not defined";
        assert_eq!(rules.first_defect(body).unwrap().kind, "missing_tooltip_import");
    }

    #[test]
    fn test_type_error_alternation() {
        let rules = RuleSet::builtin().unwrap();
        for body in [
            "TypeError: Cannot read property of undefined",
            "TypeError: Cannot read properties of null",
        ] {
            assert_eq!(rules.first_defect(body).unwrap().kind, "type_error");
        }
        assert!(rules.first_defect("TypeError: Cannot read properties").is_none());
    }

    #[test]
    fn test_invalid_pattern_is_reported_with_kind() {
        let mut table = RuleTable::default();
        table.defects.push(DefectRuleSpec {
            kind: "broken".to_string(),
            pattern: "(unclosed".to_string(),
            severity: Severity::Low,
            hint: None,
        });

        match RuleSet::compile(&table) {
            Err(HarnessError::InvalidRule { kind, .. }) => assert_eq!(kind, "broken"),
            other => panic!("expected InvalidRule, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_markers() {
        let rules = RuleSet::builtin().unwrap();
        assert!(rules.has_expected_markup(r#"<div id="storybook-root"></div>"#));
        assert!(!rules.has_expected_markup("<div></div>"));
        assert!(rules.has_optional_feature_markup(r#"<section class="code-variants">"#));
        assert!(!rules.has_optional_feature_markup("<section>"));
    }

    #[test]
    fn test_hint_lookup() {
        let rules = RuleSet::builtin().unwrap();
        assert!(rules.hint_for("missing_icon_import").is_some());
        assert!(rules.hint_for("syntax_error").is_none());
        assert!(rules.hint_for("nope").is_none());
    }

    #[test]
    fn test_rule_table_from_toml_uses_defaults_for_missing_fields() {
        let table: RuleTable = toml::from_str(
            r#"
[[defects]]
kind = "hydration"
pattern = "Hydration failed"
"#,
        )
        .unwrap();
        assert_eq!(table.defects.len(), 1);
        assert_eq!(table.defects[0].severity, Severity::High);
        assert_eq!(table.warnings, default_warning_rules());
        assert!(!table.expected_markers.is_empty());
    }
}
