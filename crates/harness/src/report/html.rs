//! HTML report, assembled from one builder per section

use crate::aggregate::RunSummary;
use crate::classify::ClassifiedResult;

use super::RenderOptions;

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; background: #f5f5f5; }
.container { max-width: 1400px; margin: 0 auto; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 12px; margin-bottom: 30px; }
.summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 20px; margin-bottom: 30px; }
.metric { background: white; padding: 20px; border-radius: 12px; text-align: center; box-shadow: 0 4px 15px rgba(0,0,0,0.1); }
.metric h3 { margin: 0; font-size: 2.2em; font-weight: 300; }
.metric p { margin: 10px 0 0 0; color: #666; }
.metric.success { border-left: 5px solid #28a745; }
.metric.error { border-left: 5px solid #dc3545; }
.metric.warning { border-left: 5px solid #ffc107; }
.metric.info { border-left: 5px solid #17a2b8; }
section { background: white; padding: 25px; border-radius: 12px; margin-bottom: 25px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
nav a { margin-right: 18px; }
.item { border-left: 5px solid #28a745; padding: 12px 18px; margin: 12px 0; background: #fafafa; border-radius: 8px; }
.item.failed, .item.network_error { border-left-color: #dc3545; }
.status { padding: 3px 12px; border-radius: 20px; color: white; font-size: 0.75em; font-weight: bold; text-transform: uppercase; }
.status.passed { background: #28a745; }
.status.failed, .status.network_error { background: #dc3545; }
.status.info { background: #17a2b8; }
.stats span, .stat { display: inline-block; margin: 4px 12px 4px 0; padding: 3px 10px; background: #e9ecef; border-radius: 15px; font-size: 0.85em; }
.url { color: #6c757d; font-family: Menlo, monospace; font-size: 0.85em; word-break: break-all; }
.error-details { background: #f8d7da; padding: 12px; border-radius: 8px; margin: 10px 0; }
.warning-details { background: #fff3cd; padding: 12px; border-radius: 8px; margin: 10px 0; }
.pattern { background: #721c24; color: #f8d7da; padding: 2px 8px; border-radius: 12px; font-size: 0.8em; font-family: Menlo, monospace; }
.critical { border: 2px solid #dc3545; background: #fff5f5; }
.clear { color: #28a745; font-weight: bold; }
"#;

/// Escape text for safe inclusion in HTML element content and attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn kib(bytes: u64) -> String {
    format!("{:.1}KB", bytes as f64 / 1024.0)
}

fn mib(bytes: u64) -> String {
    format!("{:.2}MB", bytes as f64 / 1024.0 / 1024.0)
}

fn all_clear(message: &str) -> String {
    format!("<p class=\"clear\">{}</p>\n", escape(message))
}

pub(super) fn render_document(summary: &RunSummary, options: &RenderOptions) -> String {
    let sections = [
        header(summary),
        metric_cards(summary),
        navigation(summary),
        overview(summary),
        all_results(summary),
        failed_results(summary),
        missing_optional_feature(summary),
        performance(summary, options),
    ];

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Documentation Regression Report</title>\n<style>{}</style>\n</head>\n<body>\n<div class=\"container\">\n{}</div>\n</body>\n</html>\n",
        STYLE,
        sections.concat()
    )
}

pub(super) fn header(summary: &RunSummary) -> String {
    let duration = summary
        .duration_secs()
        .map(|s| format!("{} seconds", s))
        .unwrap_or_else(|| "N/A".to_string());
    let completed = summary
        .completed_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "incomplete".to_string());

    format!(
        "<div class=\"header\">\n<h1>Documentation Regression Report</h1>\n<p>Server: {}</p>\n<p>Started: {} | Completed: {} | Duration: {}</p>\n</div>\n",
        escape(&summary.base_url),
        summary.started_at.to_rfc3339(),
        escape(&completed),
        duration
    )
}

fn card(class: &str, value: &str, label: &str) -> String {
    format!(
        "<div class=\"metric {}\"><h3>{}</h3><p>{}</p></div>\n",
        class, value, label
    )
}

pub(super) fn metric_cards(summary: &RunSummary) -> String {
    let cards = [
        card("", &summary.total.to_string(), "Total Targets Tested"),
        card("success", &summary.passed.to_string(), "Passed"),
        card("error", &summary.failed.to_string(), "Failed"),
        card("info", &format!("{:.1}%", summary.success_rate()), "Success Rate"),
        card(
            "success",
            &summary.with_optional_feature.to_string(),
            "With Optional Feature",
        ),
        card("error", &summary.total_errors.to_string(), "Errors"),
        card("warning", &summary.total_warnings.to_string(), "Warnings"),
        card(
            "info",
            &format!("{}ms", summary.average_elapsed_millis),
            "Average Load Time",
        ),
    ];
    format!("<div class=\"summary\">\n{}</div>\n", cards.concat())
}

fn navigation(summary: &RunSummary) -> String {
    format!(
        "<nav><a href=\"#overview\">Overview</a><a href=\"#all\">All ({})</a><a href=\"#failed\">Failed ({})</a><a href=\"#missing\">Missing Optional Feature ({})</a><a href=\"#performance\">Performance</a></nav>\n",
        summary.results.len(),
        summary.failed_results().count(),
        summary.missing_optional_feature().count()
    )
}

pub(super) fn overview(summary: &RunSummary) -> String {
    let mut out = String::from("<section id=\"overview\">\n<h2>Overview</h2>\n");

    if summary.results.is_empty() {
        out.push_str(&all_clear("No targets were tested in this run."));
    }

    let failed = summary.failed_results().count();
    if failed > 0 {
        out.push_str(&format!(
            "<div class=\"critical\"><h3>Critical Issues</h3><p><strong>{}</strong> targets failed. Errors: <strong>{}</strong>, warnings: <strong>{}</strong>.</p><p><a href=\"#failed\">View failed targets</a></p></div>\n",
            failed, summary.total_errors, summary.total_warnings
        ));
    } else if !summary.results.is_empty() {
        out.push_str(&all_clear("Every target passed."));
    }

    let missing = summary.missing_optional_feature().count();
    if missing > 0 {
        out.push_str(&format!(
            "<div class=\"warning-details\"><p><strong>{}</strong> stories are missing the optional feature markup. <a href=\"#missing\">View them</a></p></div>\n",
            missing
        ));
    }

    out.push_str("<h3>Results by Category</h3>\n<div class=\"stats\">");
    let counts = summary.category_counts();
    if counts.is_empty() {
        out.push_str("<span>none</span>");
    }
    for (category, count) in counts {
        out.push_str(&format!("<span>{}: <strong>{}</strong></span>", category, count));
    }
    out.push_str("</div>\n");

    let total_bytes = summary.total_bytes();
    let average_bytes = if summary.results.is_empty() {
        0
    } else {
        total_bytes / summary.results.len() as u64
    };
    let fmt_ms = |v: Option<u64>| v.map(|ms| format!("{}ms", ms)).unwrap_or_else(|| "N/A".to_string());
    out.push_str(&format!(
        "<h3>Key Metrics</h3>\n<div class=\"stats\"><span>Total Response Size: <strong>{}</strong></span><span>Average Response Size: <strong>{}</strong></span><span>Total Load Time: <strong>{}ms</strong></span><span>Fastest Load: <strong>{}</strong></span><span>Slowest Load: <strong>{}</strong></span></div>\n",
        mib(total_bytes),
        kib(average_bytes),
        summary.total_elapsed_millis(),
        fmt_ms(summary.min_elapsed_millis()),
        fmt_ms(summary.max_elapsed_millis())
    ));

    out.push_str("</section>\n");
    out
}

fn result_item(result: &ClassifiedResult, with_details: bool) -> String {
    let status = result.outcome.as_str();
    let mut out = format!(
        "<div class=\"item {status}\">\n<h4>#{} {} <span class=\"status {status}\">{status}</span></h4>\n",
        result.id,
        escape(&result.label),
        status = status
    );

    let http = result
        .http_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    out.push_str(&format!(
        "<div class=\"stats\"><span>Category: {}</span><span>HTTP: {}</span><span>Load Time: {}ms</span><span>Size: {}</span><span>Mounted: {}</span><span>Optional Feature: {}</span></div>\n",
        result.category,
        http,
        result.elapsed_millis,
        kib(result.byte_size),
        if result.has_expected_markup { "yes" } else { "no" },
        if result.has_optional_feature_markup { "yes" } else { "no" },
    ));
    out.push_str(&format!("<div class=\"url\">{}</div>\n", escape(&result.url)));

    if with_details && !result.defects.is_empty() {
        out.push_str(&format!(
            "<div class=\"error-details\"><strong>Errors ({}):</strong>\n",
            result.defects.len()
        ));
        for defect in &result.defects {
            out.push_str(&format!(
                "<div><strong>{}</strong> [{}]: {}",
                escape(&defect.kind),
                defect.severity,
                escape(&defect.message)
            ));
            if let Some(pattern) = &defect.pattern {
                out.push_str(&format!(" <span class=\"pattern\">{}</span>", escape(pattern)));
            }
            out.push_str("</div>\n");
        }
        out.push_str("</div>\n");
    }

    if !result.warnings.is_empty() {
        out.push_str(&format!(
            "<div class=\"warning-details\"><strong>Warnings ({}):</strong> ",
            result.warnings.len()
        ));
        for warning in &result.warnings {
            out.push_str(&format!("<span class=\"pattern\">{}</span> ", escape(&warning.kind)));
        }
        out.push_str("</div>\n");
    }

    out.push_str("</div>\n");
    out
}

pub(super) fn all_results(summary: &RunSummary) -> String {
    let mut out = String::from("<section id=\"all\">\n<h2>All Results</h2>\n");
    if summary.results.is_empty() {
        out.push_str(&all_clear("No results to show."));
    }
    for result in &summary.results {
        out.push_str(&result_item(result, false));
    }
    out.push_str("</section>\n");
    out
}

pub(super) fn failed_results(summary: &RunSummary) -> String {
    let mut out = String::from("<section id=\"failed\">\n<h2>Failed Targets</h2>\n");
    let mut any = false;
    for result in summary.failed_results() {
        any = true;
        out.push_str(&result_item(result, true));
    }
    if !any {
        out.push_str(&all_clear("No failed targets. All clear."));
    }
    out.push_str("</section>\n");
    out
}

pub(super) fn missing_optional_feature(summary: &RunSummary) -> String {
    let mut out = String::from("<section id=\"missing\">\n<h2>Stories Missing the Optional Feature</h2>\n");
    let mut any = false;
    for result in summary.missing_optional_feature() {
        any = true;
        out.push_str(&format!(
            "<div class=\"item\"><h4>#{} {}</h4><div class=\"stats\"><span>Load Time: {}ms</span></div><div class=\"url\">{}</div></div>\n",
            result.id,
            escape(&result.label),
            result.elapsed_millis,
            escape(&result.url)
        ));
    }
    if !any {
        out.push_str(&all_clear("Every passing story carries the optional feature. All clear."));
    }
    out.push_str("</section>\n");
    out
}

fn performance_table(title: &str, rows: &[&ClassifiedResult], slow_millis: u64, by_size: bool) -> String {
    let mut out = format!("<h3>{}</h3>\n", escape(title));
    if rows.is_empty() {
        out.push_str("<p>No performance data available.</p>\n");
        return out;
    }
    for result in rows {
        let (badge_class, badge) = if by_size {
            ("info", kib(result.byte_size))
        } else if result.elapsed_millis > slow_millis {
            ("failed", format!("{}ms", result.elapsed_millis))
        } else {
            ("passed", format!("{}ms", result.elapsed_millis))
        };
        out.push_str(&format!(
            "<div class=\"item\"><h4>{} <span class=\"status {}\">{}</span></h4>",
            escape(&result.label),
            badge_class,
            badge
        ));
        if !by_size && result.elapsed_millis > slow_millis {
            out.push_str(&format!(
                "<div class=\"warning-details\">Load time exceeds {}ms</div>",
                slow_millis
            ));
        }
        out.push_str("</div>\n");
    }
    out
}

pub(super) fn performance(summary: &RunSummary, options: &RenderOptions) -> String {
    let t = &options.thresholds;
    let mut out = String::from("<section id=\"performance\">\n<h2>Performance</h2>\n");
    out.push_str(&performance_table("Fastest", &summary.fastest(t.top_n), t.slow_millis, false));
    out.push_str(&performance_table("Slowest", &summary.slowest(t.top_n), t.slow_millis, false));
    out.push_str(&performance_table("Largest Responses", &summary.largest(t.top_n), t.slow_millis, true));
    out.push_str("</section>\n");
    out
}
