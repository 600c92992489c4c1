//! Summary statistics over a benchmark run.

use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

use crate::types::{BenchmarkResult, BenchmarkRun, FailureKind};

/// Duration statistics over a set of successful rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStatistics {
    pub mean: Duration,
    pub median: Duration,
    pub std_dev_ms: f64,
    pub min: Duration,
    pub max: Duration,
    pub p95: Duration,
    pub sample_count: usize,
}

impl Default for DurationStatistics {
    fn default() -> Self {
        Self {
            mean: Duration::ZERO,
            median: Duration::ZERO,
            std_dev_ms: 0.0,
            min: Duration::ZERO,
            max: Duration::ZERO,
            p95: Duration::ZERO,
            sample_count: 0,
        }
    }
}

/// Per-tool summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSummary {
    pub tool: String,
    pub attempts: usize,
    pub successes: usize,
    /// Successes / attempts, in `0.0..=1.0`
    pub success_rate: f64,
    pub timeouts: usize,
    /// Mean character count over successful rows
    pub mean_char_count: f64,
    /// Timing over successful rows only
    pub durations: DurationStatistics,
}

/// Whole-run summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Distinct documents in the run
    pub total_documents: usize,
    pub total_extractions: usize,
    pub successful_extractions: usize,
    pub success_rate: f64,
    /// One entry per tool, in run order
    pub tools: Vec<ToolSummary>,
}

impl RunSummary {
    pub fn from_run(run: &BenchmarkRun) -> Self {
        summarize(&run.results, &run.tools)
    }

    /// Summary of the fastest tool by mean duration, among tools with at least one success
    pub fn fastest_tool(&self) -> Option<&ToolSummary> {
        self.tools
            .iter()
            .filter(|t| t.successes > 0)
            .min_by(|a, b| a.durations.mean.cmp(&b.durations.mean))
    }
}

/// Summarize rows. Tools listed in `tool_order` come first in that order;
/// tools only seen in the rows follow in order of first appearance.
pub fn summarize(results: &[BenchmarkResult], tool_order: &[String]) -> RunSummary {
    let mut tools: Vec<String> = tool_order.to_vec();
    for result in results {
        if !tools.contains(&result.tool) {
            tools.push(result.tool.clone());
        }
    }

    let total_documents = results
        .iter()
        .map(|r| r.document_path.as_path())
        .collect::<HashSet<_>>()
        .len();
    let successful_extractions = results.iter().filter(|r| r.success).count();

    RunSummary {
        total_documents,
        total_extractions: results.len(),
        successful_extractions,
        success_rate: ratio(successful_extractions, results.len()),
        tools: tools
            .iter()
            .map(|tool| {
                let rows: Vec<&BenchmarkResult> = results.iter().filter(|r| &r.tool == tool).collect();
                summarize_tool(tool, &rows)
            })
            .collect(),
    }
}

fn summarize_tool(tool: &str, rows: &[&BenchmarkResult]) -> ToolSummary {
    let successful: Vec<&BenchmarkResult> = rows.iter().copied().filter(|r| r.success).collect();
    let durations: Vec<Duration> = successful.iter().map(|r| r.duration).collect();

    let mean_char_count = if successful.is_empty() {
        0.0
    } else {
        successful.iter().map(|r| r.char_count as f64).sum::<f64>() / successful.len() as f64
    };

    ToolSummary {
        tool: tool.to_string(),
        attempts: rows.len(),
        successes: successful.len(),
        success_rate: ratio(successful.len(), rows.len()),
        timeouts: rows
            .iter()
            .filter(|r| r.failure_kind == Some(FailureKind::Timeout))
            .count(),
        mean_char_count,
        durations: calculate_statistics(&durations),
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}

/// Calculate percentile from duration values
///
/// # Arguments
/// * `values` - Duration values (will be sorted)
/// * `percentile` - Percentile to calculate (0.0 - 1.0)
fn calculate_duration_percentile(mut values: Vec<Duration>, percentile: f64) -> Duration {
    if values.is_empty() {
        return Duration::ZERO;
    }

    values.sort();
    let index = ((values.len() as f64 - 1.0) * percentile).max(0.0) as usize;
    values[index]
}

/// Mean, median, spread and p95 of a set of durations
pub fn calculate_statistics(durations: &[Duration]) -> DurationStatistics {
    let (Some(&min), Some(&max)) = (durations.iter().min(), durations.iter().max()) else {
        return DurationStatistics::default();
    };

    let mean_ms = durations.iter().map(|d| d.as_secs_f64() * 1000.0).sum::<f64>() / durations.len() as f64;

    let variance = durations
        .iter()
        .map(|d| {
            let diff = d.as_secs_f64() * 1000.0 - mean_ms;
            diff * diff
        })
        .sum::<f64>()
        / durations.len() as f64;

    DurationStatistics {
        mean: Duration::from_secs_f64(mean_ms / 1000.0),
        median: calculate_duration_percentile(durations.to_vec(), 0.50),
        std_dev_ms: variance.sqrt(),
        min,
        max,
        p95: calculate_duration_percentile(durations.to_vec(), 0.95),
        sample_count: durations.len(),
    }
}
