//! Report rendering: a structured JSON dump and a browsable HTML document

mod html;

use serde::Serialize;
use tracing::info;

use crate::aggregate::{RunSummary, Thresholds};
use crate::config::ReportPaths;
use crate::error::HarnessResult;

pub use html::escape;

/// Knobs for the human-readable report
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub thresholds: Thresholds,
}

/// Both report artifacts, rendered but not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub structured: String,
    pub human_readable: String,
}

/// Render both artifacts from a finished (or partial) summary
pub fn render(summary: &RunSummary, options: &RenderOptions) -> HarnessResult<RenderedReport> {
    Ok(RenderedReport {
        structured: render_structured(summary)?,
        human_readable: html::render_document(summary, options),
    })
}

/// Lossless pretty JSON of the summary, including every result
pub fn render_structured(summary: &RunSummary) -> HarnessResult<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Paths of the artifacts a run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportArtifacts {
    pub json: std::path::PathBuf,
    pub html: std::path::PathBuf,
}

/// Write each artifact once, creating the output directory if needed
pub fn write_reports(report: &RenderedReport, paths: &ReportPaths) -> HarnessResult<ReportArtifacts> {
    for path in [&paths.json, &paths.html] {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(&paths.json, &report.structured)?;
    std::fs::write(&paths.html, &report.human_readable)?;

    info!("Reports written:");
    info!("  JSON: {}", paths.json.display());
    info!("  HTML: {}", paths.html.display());

    Ok(ReportArtifacts {
        json: paths.json.clone(),
        html: paths.html.clone(),
    })
}
