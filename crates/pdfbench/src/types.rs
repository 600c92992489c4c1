//! Core data model: documents, extraction output, result rows and runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A PDF file selected for benchmarking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfDocument {
    /// Path to the PDF file
    pub path: PathBuf,
    /// File name used to identify the document in results
    pub name: String,
    /// File size in bytes at discovery time (0 if it could not be read)
    pub file_size: u64,
}

impl PdfDocument {
    /// Build a document from a path, capturing its name and size.
    ///
    /// A relative path is resolved against the current directory. Never fails: a document whose metadata cannot be read is still a
    /// document, and the runner records it as unopenable later.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = std::path::absolute(&path).unwrap_or(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Self { path, name, file_size }
    }

    /// File stem, used to name per-document scratch directories.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Text returned by a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
}

impl Extraction {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Number of Unicode scalar values in the raw text, without normalisation.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// How a tool is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// External executable, one process per document
    Subprocess,
    /// Library call inside this process
    InProcess,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Subprocess => "subprocess",
            ToolKind::InProcess => "in_process",
        }
    }
}

/// Why a result row failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The document could not be opened at all
    DocumentOpen,
    /// The tool exited non-zero, raised an error, or was unavailable
    ToolFailure,
    /// The tool exceeded the per-invocation timeout
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::DocumentOpen => "document_open",
            FailureKind::ToolFailure => "tool_failure",
            FailureKind::Timeout => "timeout",
        }
    }
}

/// Outcome of one (document, tool) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Document identifier (file name)
    pub document: String,
    /// Full path of the document
    pub document_path: PathBuf,
    /// Document size in bytes
    pub file_size: u64,
    /// Tool name
    pub tool: String,
    /// Whether extraction succeeded
    pub success: bool,
    /// Wall-clock duration of the invocation
    pub duration: Duration,
    /// Characters extracted (0 for failed rows)
    pub char_count: usize,
    /// Failure classification
    pub failure_kind: Option<FailureKind>,
    /// Human-readable error message
    pub error_message: Option<String>,
}

impl BenchmarkResult {
    pub fn succeeded(document: &PdfDocument, tool: &str, duration: Duration, char_count: usize) -> Self {
        Self {
            document: document.name.clone(),
            document_path: document.path.clone(),
            file_size: document.file_size,
            tool: tool.to_string(),
            success: true,
            duration,
            char_count,
            failure_kind: None,
            error_message: None,
        }
    }

    pub fn failed(
        document: &PdfDocument,
        tool: &str,
        duration: Duration,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            document: document.name.clone(),
            document_path: document.path.clone(),
            file_size: document.file_size,
            tool: tool.to_string(),
            success: false,
            duration,
            char_count: 0,
            failure_kind: Some(kind),
            error_message: Some(message.into()),
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    pub fn size_mb(&self) -> f64 {
        self.file_size as f64 / (1024.0 * 1024.0)
    }
}

/// All rows produced by one sweep over a document set and a tool set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Number of documents in the sweep
    pub document_count: usize,
    /// Tool names in the order they were run
    pub tools: Vec<String>,
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkRun {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn successful(&self) -> impl Iterator<Item = &BenchmarkResult> {
        self.results.iter().filter(|r| r.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &BenchmarkResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Rows for a single tool, in document order.
    pub fn for_tool<'a>(&'a self, tool: &'a str) -> impl Iterator<Item = &'a BenchmarkResult> + 'a {
        self.results.iter().filter(move |r| r.tool == tool)
    }

    /// Row for one (document, tool) pair.
    pub fn find(&self, document: &str, tool: &str) -> Option<&BenchmarkResult> {
        self.results.iter().find(|r| r.document == document && r.tool == tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> PdfDocument {
        PdfDocument {
            path: PathBuf::from(format!("/data/{}", name)),
            name: name.to_string(),
            file_size: 2 * 1024 * 1024,
        }
    }

    #[test]
    fn test_char_count_counts_scalar_values() {
        let extraction = Extraction::new("Größe ✓\n");
        assert_eq!(extraction.char_count(), 8);
        assert!(extraction.text.len() > 8);
    }

    #[test]
    fn test_document_from_missing_path() {
        let document = PdfDocument::from_path("/definitely/not/here/report.PDF");
        assert_eq!(document.name, "report.PDF");
        assert_eq!(document.stem(), "report");
        assert_eq!(document.file_size, 0);
    }

    #[test]
    fn test_failed_row_has_zero_chars() {
        let row = BenchmarkResult::failed(
            &doc("a.pdf"),
            "mineru",
            Duration::from_millis(5),
            FailureKind::ToolFailure,
            "exit 1",
        );
        assert!(!row.success);
        assert_eq!(row.char_count, 0);
        assert_eq!(row.failure_kind, Some(FailureKind::ToolFailure));
        assert_eq!(row.size_mb(), 2.0);
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::DocumentOpen).unwrap();
        assert_eq!(json, "\"document_open\"");
        assert_eq!(FailureKind::Timeout.as_str(), "timeout");
    }

    #[test]
    fn test_run_lookup() {
        let a = doc("a.pdf");
        let run = BenchmarkRun {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            document_count: 1,
            tools: vec!["x".to_string(), "y".to_string()],
            results: vec![
                BenchmarkResult::succeeded(&a, "x", Duration::from_millis(10), 42),
                BenchmarkResult::failed(&a, "y", Duration::ZERO, FailureKind::Timeout, "slow"),
            ],
        };

        assert_eq!(run.len(), 2);
        assert_eq!(run.successful().count(), 1);
        assert_eq!(run.failed().count(), 1);
        assert_eq!(run.for_tool("x").count(), 1);
        assert_eq!(run.find("a.pdf", "x").map(|r| r.char_count), Some(42));
        assert!(run.find("b.pdf", "x").is_none());
    }
}
