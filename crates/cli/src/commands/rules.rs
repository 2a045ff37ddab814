//! Rules Command

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use docprobe_harness::{HarnessConfig, RuleSet};

use super::config_path;
use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Debug, Args)]
pub struct RulesArgs {
    /// Configuration file (defaults to ./docprobe.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Serialize)]
pub struct RuleDisplay {
    pub kind: String,
    /// "defect" or "warning"
    pub class: &'static str,
    pub severity: Option<String>,
    pub pattern: String,
    pub hint: Option<String>,
}

impl TableDisplay for RuleDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Kind", "Class", "Severity", "Pattern", "Hint"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.kind.clone(),
            self.class.to_string(),
            self.severity.clone().unwrap_or_else(|| "-".to_string()),
            self.pattern.clone(),
            self.hint.clone().unwrap_or_default(),
        ]
    }
}

/// Defect rules in match order, then warning rules
pub fn list(rules: &RuleSet) -> Vec<RuleDisplay> {
    let defects = rules.defects().iter().map(|rule| RuleDisplay {
        kind: rule.kind.clone(),
        class: "defect",
        severity: Some(rule.severity.to_string()),
        pattern: rule.pattern.as_str().to_string(),
        hint: rule.hint.clone(),
    });
    let warnings = rules.warnings().iter().map(|rule| RuleDisplay {
        kind: rule.kind.clone(),
        class: "warning",
        severity: None,
        pattern: rule.pattern.as_str().to_string(),
        hint: None,
    });
    defects.chain(warnings).collect()
}

pub fn execute(args: RulesArgs, format: OutputFormat) -> Result<()> {
    let path = config_path(args.config.as_deref());
    let config = HarnessConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    let rules = RuleSet::compile(&config.rules)?;
    print_list(&list(&rules), format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defects_listed_before_warnings() {
        let rows = list(&RuleSet::builtin().unwrap());
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].kind, "destructure_undefined");
        assert!(rows[..9].iter().all(|r| r.class == "defect"));
        assert!(rows[9..].iter().all(|r| r.class == "warning" && r.severity.is_none()));
    }
}
