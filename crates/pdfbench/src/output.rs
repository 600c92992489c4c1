//! Output writers for benchmark results
//!
//! A run can be exported as pretty JSON, as a flat CSV table (one line per
//! result row) and as a standalone HTML report (see [`crate::html`]).

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::types::BenchmarkRun;
use crate::{PdfBenchError, Result};

/// CSV column order
pub const CSV_HEADER: &str = "file,tool,success,time_seconds,size_mb,char_count,failure_kind,error";

pub const JSON_FILE_NAME: &str = "results.json";
pub const CSV_FILE_NAME: &str = "results.csv";
pub const HTML_FILE_NAME: &str = "report.html";

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Html];

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Json => JSON_FILE_NAME,
            ExportFormat::Csv => CSV_FILE_NAME,
            ExportFormat::Html => HTML_FILE_NAME,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PdfBenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            other => Err(PdfBenchError::validation(format!(
                "Unknown export format '{}' (expected json, csv or html)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        };
        f.write_str(name)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write a run to a JSON file
///
/// # Arguments
/// * `run` - Run to write
/// * `output_path` - Path to output JSON file
pub fn write_json(run: &BenchmarkRun, output_path: &Path) -> Result<()> {
    ensure_parent(output_path)?;

    let json = serde_json::to_string_pretty(run)
        .map_err(|e| PdfBenchError::serialization_with_source("Failed to serialize results", e))?;

    fs::write(output_path, json)?;
    Ok(())
}

/// Read a run back from a JSON file written by [`write_json`]
pub fn read_json(path: &Path) -> Result<BenchmarkRun> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render the results table as CSV
pub fn to_csv_string(run: &BenchmarkRun) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for row in &run.results {
        let fields = [
            csv_escape(&row.document),
            csv_escape(&row.tool),
            row.success.to_string(),
            format!("{:.3}", row.duration_secs()),
            format!("{:.3}", row.size_mb()),
            row.char_count.to_string(),
            row.failure_kind.map(|k| k.as_str()).unwrap_or("").to_string(),
            csv_escape(row.error_message.as_deref().unwrap_or("")),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

pub fn write_csv(run: &BenchmarkRun, output_path: &Path) -> Result<()> {
    ensure_parent(output_path)?;
    fs::write(output_path, to_csv_string(run))?;
    Ok(())
}

/// Write the selected formats into `dir`, creating it if needed.
///
/// # Returns
/// Paths of the written files, in the order of `formats`.
pub fn write_report(run: &BenchmarkRun, dir: &Path, formats: &[ExportFormat]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = dir.join(format.file_name());
        match format {
            ExportFormat::Json => write_json(run, &path)?,
            ExportFormat::Csv => write_csv(run, &path)?,
            ExportFormat::Html => crate::html::write_html(run, &path)?,
        }
        tracing::debug!("Wrote {} export to {}", format, path.display());
        written.push(path);
    }

    Ok(written)
}
