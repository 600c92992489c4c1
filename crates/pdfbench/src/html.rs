//! HTML rendering for benchmark results
//!
//! Produces a single self-contained page (Chart.js from a CDN aside) with
//! summary cards, a success-rate chart, an average-time chart and the full
//! results table. The dashboard page reuses the same partials around a form
//! that starts a new run.

use minijinja::{AutoEscape, Environment, context};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::Result;
use crate::stats::{RunSummary, ToolSummary};
use crate::types::{BenchmarkResult, BenchmarkRun};

/// Chart series, one entry per tool in run order
#[derive(Debug, Clone, Serialize)]
struct ChartData {
    tools: Vec<String>,
    /// Success rate in percent
    success_rates: Vec<f64>,
    /// Mean duration of successful rows in seconds
    mean_durations_secs: Vec<f64>,
    p95_durations_secs: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct RowView {
    file: String,
    tool: String,
    success: bool,
    time_seconds: String,
    size_mb: String,
    char_count: usize,
    failure_kind: Option<&'static str>,
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ReportData {
    started_at: String,
    finished_at: String,
    duration_secs: f64,
    summary: RunSummary,
    chart: ChartData,
    rows: Vec<RowView>,
}

/// Static template environment (initialized once)
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn init_template_env() -> Environment<'static> {
    let mut env = Environment::new();

    // Templates are embedded at compile time; a failure here is a build defect.
    env.add_template("report.html.jinja", include_str!("../templates/report.html.jinja"))
        .expect("Failed to add report template");
    env.add_template("dashboard.html.jinja", include_str!("../templates/dashboard.html.jinja"))
        .expect("Failed to add dashboard template");

    env.add_template(
        "partials/styles.css.jinja",
        include_str!("../templates/partials/styles.css.jinja"),
    )
    .expect("Failed to add styles template");
    env.add_template(
        "partials/summary.html.jinja",
        include_str!("../templates/partials/summary.html.jinja"),
    )
    .expect("Failed to add summary template");
    env.add_template(
        "partials/charts.html.jinja",
        include_str!("../templates/partials/charts.html.jinja"),
    )
    .expect("Failed to add charts template");
    env.add_template(
        "partials/charts_script.js.jinja",
        include_str!("../templates/partials/charts_script.js.jinja"),
    )
    .expect("Failed to add charts script template");
    env.add_template(
        "partials/results_table.html.jinja",
        include_str!("../templates/partials/results_table.html.jinja"),
    )
    .expect("Failed to add results table template");
    env.add_template(
        "partials/empty_state.html.jinja",
        include_str!("../templates/partials/empty_state.html.jinja"),
    )
    .expect("Failed to add empty state template");

    env.set_auto_escape_callback(|name| {
        if name.ends_with(".html.jinja") || name.ends_with(".css.jinja") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });

    env
}

fn get_template_env() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_template_env)
}

fn chart_data(tools: &[ToolSummary]) -> ChartData {
    ChartData {
        tools: tools.iter().map(|t| t.tool.clone()).collect(),
        success_rates: tools.iter().map(|t| round2(t.success_rate * 100.0)).collect(),
        mean_durations_secs: tools
            .iter()
            .map(|t| round2(t.durations.mean.as_secs_f64()))
            .collect(),
        p95_durations_secs: tools
            .iter()
            .map(|t| round2(t.durations.p95.as_secs_f64()))
            .collect(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn row_view(row: &BenchmarkResult) -> RowView {
    RowView {
        file: row.document.clone(),
        tool: row.tool.clone(),
        success: row.success,
        time_seconds: format!("{:.2}", row.duration_secs()),
        size_mb: format!("{:.2}", row.size_mb()),
        char_count: row.char_count,
        failure_kind: row.failure_kind.map(|k| k.as_str()),
        error: row.error_message.clone(),
    }
}

fn report_data(run: &BenchmarkRun) -> ReportData {
    let summary = RunSummary::from_run(run);
    let chart = chart_data(&summary.tools);

    ReportData {
        started_at: run.started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        finished_at: run.finished_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        duration_secs: (run.finished_at - run.started_at).num_milliseconds() as f64 / 1000.0,
        summary,
        chart,
        rows: run.results.iter().map(row_view).collect(),
    }
}

/// Render a run as a standalone HTML report
pub fn render_report(run: &BenchmarkRun) -> Result<String> {
    let template = get_template_env().get_template("report.html.jinja")?;
    let html = template.render(context! {
        data => report_data(run),
        generated_at => chrono::Utc::now().to_rfc3339(),
        version => env!("CARGO_PKG_VERSION"),
    })?;
    Ok(html)
}

/// Render the dashboard page.
///
/// # Arguments
/// * `run` - Latest run, if any
/// * `tools` - Registered tool names offered in the run form
/// * `default_directory` - Pre-filled data directory
pub fn render_dashboard(run: Option<&BenchmarkRun>, tools: &[String], default_directory: &str) -> Result<String> {
    let template = get_template_env().get_template("dashboard.html.jinja")?;
    let html = template.render(context! {
        data => run.map(report_data),
        tools => tools,
        default_directory => default_directory,
        version => env!("CARGO_PKG_VERSION"),
    })?;
    Ok(html)
}

/// Write a run as an HTML report
///
/// # Arguments
/// * `run` - Run to visualize
/// * `output_path` - Path to output HTML file
pub fn write_html(run: &BenchmarkRun, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let html = render_report(run)?;
    fs::write(output_path, html)?;
    Ok(())
}
