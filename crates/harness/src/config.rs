//! Harness configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::aggregate::Thresholds;
use crate::error::{HarnessError, HarnessResult};
use crate::rules::RuleTable;

pub const DEFAULT_BASE_URL: &str = "http://localhost:6006";
pub const JSON_REPORT_FILE: &str = "regression-results.json";
pub const HTML_REPORT_FILE: &str = "regression-results.html";

/// Harness configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Root URL of the documentation server under test
    pub base_url: String,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Pause between consecutive probes (milliseconds)
    pub throttle_ms: u64,

    /// Directory the two report files are written to
    pub output_dir: PathBuf,

    pub thresholds: Thresholds,

    pub rules: RuleTable,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            throttle_ms: 200,
            output_dir: PathBuf::from("test-results"),
            thresholds: Thresholds::default(),
            rules: RuleTable::default(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> HarnessResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> HarnessResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> HarnessResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(HarnessError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(HarnessError::Config("timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn report_paths(&self) -> ReportPaths {
        ReportPaths::in_dir(&self.output_dir)
    }
}

/// Where the structured and human-readable reports land
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

impl ReportPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            json: dir.join(JSON_REPORT_FILE),
            html: dir.join(HTML_REPORT_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.throttle(), Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/docprobe.toml");

        let mut config = HarnessConfig::default();
        config.base_url = "http://127.0.0.1:9009".to_string();
        config.throttle_ms = 0;
        config.thresholds.slow_millis = 750;
        config.save(&path).unwrap();

        assert_eq!(HarnessConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docprobe.toml");
        std::fs::write(&path, "base_url = \"https://docs.internal\"\n[thresholds]\ntop_n = 3\n").unwrap();

        let config = HarnessConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "https://docs.internal");
        assert_eq!(config.thresholds.top_n, 3);
        assert_eq!(config.thresholds.slow_millis, 5_000);
        assert_eq!(config.rules, RuleTable::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = HarnessConfig::default();
        config.base_url = "localhost:6006".to_string();
        assert!(matches!(config.validate(), Err(HarnessError::Config(_))));

        let mut config = HarnessConfig::default();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_report_paths() {
        let paths = ReportPaths::in_dir(Path::new("out"));
        assert_eq!(paths.json, Path::new("out").join(JSON_REPORT_FILE));
        assert_eq!(paths.html, Path::new("out").join(HTML_REPORT_FILE));
    }
}
