//! Benchmark runner
//!
//! Runs every tool on every document, one pair at a time: documents in the
//! outer loop, tools in the inner loop. Each invocation is timed and bounded
//! by a timeout. A failing pair becomes a failed row and the sweep moves on;
//! only an empty document set or an empty tool set aborts a run.

use ahash::AHashSet;
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use crate::config::BenchmarkConfig;
use crate::document::check_readable;
use crate::tool::ExtractionTool;
use crate::types::{BenchmarkResult, BenchmarkRun, FailureKind, PdfDocument};
use crate::{PdfBenchError, Result};

/// Progress notification, sent before each (document, tool) pair runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress<'a> {
    /// Pairs finished so far
    pub completed: usize,
    /// Pairs in the whole run
    pub total: usize,
    /// Name of the document about to be processed
    pub document: &'a str,
    /// Name of the tool about to run
    pub tool: &'a str,
}

impl Progress<'_> {
    /// Fraction of the run finished, in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Where a single invocation writes its output.
enum Scratch {
    Temporary(TempDir),
    Persistent(PathBuf),
}

impl Scratch {
    fn path(&self) -> &Path {
        match self {
            Scratch::Temporary(dir) => dir.path(),
            Scratch::Persistent(path) => path,
        }
    }
}

/// Orchestrates a benchmark sweep
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    timeout: Duration,
    artifacts_dir: Option<PathBuf>,
}

impl BenchmarkRunner {
    /// Create a runner using the timeout and artifacts directory from `config`
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self {
            timeout: config.timeout(),
            artifacts_dir: config.artifacts_dir.clone(),
        }
    }

    /// Runner with the given per-invocation timeout and temporary scratch space
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            artifacts_dir: None,
        }
    }

    /// Keep raw tool outputs under `<dir>/<tool>/<document stem>/`.
    ///
    /// Documents sharing a stem get `-2`, `-3`, ... suffixes in run order.
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run every tool on every document.
    ///
    /// # Returns
    /// A run holding exactly `documents.len() * tools.len()` rows, in
    /// document-major order.
    ///
    /// # Errors
    /// `PdfBenchError::Validation` if either set is empty. Failures of
    /// individual pairs are recorded as rows, never returned.
    pub async fn run(&self, documents: &[PdfDocument], tools: &[Arc<dyn ExtractionTool>]) -> Result<BenchmarkRun> {
        self.run_with_progress(documents, tools, |_| {}).await
    }

    /// Same as [`run`](Self::run), calling `on_progress` before each pair.
    pub async fn run_with_progress<F>(
        &self,
        documents: &[PdfDocument],
        tools: &[Arc<dyn ExtractionTool>],
        mut on_progress: F,
    ) -> Result<BenchmarkRun>
    where
        F: FnMut(Progress<'_>),
    {
        if documents.is_empty() {
            return Err(PdfBenchError::validation("No PDF documents to benchmark"));
        }
        if tools.is_empty() {
            return Err(PdfBenchError::validation("No extraction tools selected"));
        }

        let started_at = Utc::now();
        let total = documents.len() * tools.len();

        tracing::info!(
            "Benchmarking {} document(s) with {} tool(s), timeout {:.0}s",
            documents.len(),
            tools.len(),
            self.timeout.as_secs_f64()
        );

        let artifacts_root = match &self.artifacts_dir {
            Some(dir) => Some(std::path::absolute(dir)?),
            None => None,
        };
        let artifact_names = artifact_dir_names(documents);

        let availability = self.probe_tools(tools).await;
        let mut results = Vec::with_capacity(total);

        for (document, artifact_name) in documents.iter().zip(&artifact_names) {
            let open_error = check_readable(document).err();
            if let Some(err) = &open_error {
                tracing::warn!("Skipping {}: {}", document.name, err);
            }

            for (tool, available) in tools.iter().zip(&availability) {
                on_progress(Progress {
                    completed: results.len(),
                    total,
                    document: &document.name,
                    tool: tool.name(),
                });

                let result = match (&open_error, available) {
                    (Some(err), _) => BenchmarkResult::failed(
                        document,
                        tool.name(),
                        Duration::ZERO,
                        FailureKind::DocumentOpen,
                        err.to_string(),
                    ),
                    (None, Err(message)) => BenchmarkResult::failed(
                        document,
                        tool.name(),
                        Duration::ZERO,
                        FailureKind::ToolFailure,
                        message.clone(),
                    ),
                    (None, Ok(())) => {
                        let artifacts = artifacts_root.as_deref().map(|root| (root, artifact_name.as_str()));
                        self.invoke(document, tool, artifacts).await
                    }
                };

                log_result(&result);
                results.push(result);
            }
        }

        let run = BenchmarkRun {
            started_at,
            finished_at: Utc::now(),
            document_count: documents.len(),
            tools: tools.iter().map(|t| t.name().to_string()).collect(),
            results,
        };

        tracing::info!(
            "Benchmark finished: {}/{} extractions succeeded",
            run.successful().count(),
            run.len()
        );

        Ok(run)
    }

    /// Call `setup()` once per tool. `Err` holds the message recorded on every
    /// row of an unavailable tool.
    async fn probe_tools(&self, tools: &[Arc<dyn ExtractionTool>]) -> Vec<std::result::Result<(), String>> {
        let mut availability = Vec::with_capacity(tools.len());

        for tool in tools {
            let probe = match tokio::time::timeout(self.timeout, tool.setup()).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(err)) => Err(format!("Tool '{}' is unavailable: {}", tool.name(), err)),
                Err(_) => Err(format!("Tool '{}' is unavailable: setup timed out", tool.name())),
            };

            if let Err(message) = &probe {
                tracing::warn!("{}", message);
            }
            availability.push(probe);
        }

        availability
    }

    /// Invoke one tool on one document. Never fails: every outcome is a row.
    ///
    /// `artifacts` is the artifacts root and the document's directory name there.
    async fn invoke(
        &self,
        document: &PdfDocument,
        tool: &Arc<dyn ExtractionTool>,
        artifacts: Option<(&Path, &str)>,
    ) -> BenchmarkResult {
        let name = tool.name().to_string();

        let scratch = match scratch_for(artifacts, &name) {
            Ok(scratch) => scratch,
            Err(err) => {
                return BenchmarkResult::failed(
                    document,
                    &name,
                    Duration::ZERO,
                    FailureKind::ToolFailure,
                    format!("Failed to prepare scratch directory: {}", err),
                );
            }
        };

        let task_tool = Arc::clone(tool);
        let task_document = document.clone();
        let scratch_path = scratch.path().to_path_buf();

        let start = Instant::now();
        // A panic stays inside the task; aborting it drops the tool's child process.
        let mut handle =
            tokio::spawn(async move { task_tool.extract(&task_document, &scratch_path).await });

        let outcome = match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) if join_error.is_panic() => {
                Err(PdfBenchError::tool_failed(&name, "tool panicked during extraction"))
            }
            Ok(Err(join_error)) => Err(PdfBenchError::tool_failed(&name, join_error.to_string())),
            Err(_) => {
                handle.abort();
                Err(PdfBenchError::Timeout {
                    tool: name.clone(),
                    timeout: self.timeout,
                })
            }
        };
        let duration = start.elapsed();

        drop(scratch);

        match outcome {
            Ok(extraction) => BenchmarkResult::succeeded(document, &name, duration, extraction.char_count()),
            Err(err) => BenchmarkResult::failed(document, &name, duration, err.failure_kind(), err.to_string()),
        }
    }
}

/// Scratch space for one invocation: a fresh temporary directory, or the
/// emptied `<root>/<tool>/<dir name>` when artifacts are kept.
fn scratch_for(artifacts: Option<(&Path, &str)>, tool: &str) -> Result<Scratch> {
    let Some((root, dir_name)) = artifacts else {
        return Ok(Scratch::Temporary(TempDir::new()?));
    };

    let mut components = Path::new(tool).components();
    if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
        return Err(PdfBenchError::validation(format!(
            "Tool name '{}' cannot be used as a directory name",
            tool
        )));
    }

    let dir = root.join(tool).join(dir_name);
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }
    std::fs::create_dir_all(&dir)?;
    Ok(Scratch::Persistent(dir))
}

/// One artifacts directory name per document: its stem, made unique within
/// the run by a numeric suffix.
fn artifact_dir_names(documents: &[PdfDocument]) -> Vec<String> {
    let mut used = AHashSet::with_capacity(documents.len());

    documents
        .iter()
        .map(|document| {
            let stem = match document.stem() {
                stem if stem.is_empty() || stem == "." || stem == ".." => "document".to_string(),
                stem => stem,
            };

            let mut name = stem.clone();
            let mut suffix = 1;
            while !used.insert(name.clone()) {
                suffix += 1;
                name = format!("{}-{}", stem, suffix);
            }
            name
        })
        .collect()
}

fn log_result(result: &BenchmarkResult) {
    if result.success {
        tracing::info!(
            file = %result.document,
            tool = %result.tool,
            seconds = result.duration_secs(),
            chars = result.char_count,
            "{}: {} took {:.2}s - success",
            result.document,
            result.tool,
            result.duration_secs()
        );
    } else {
        tracing::warn!(
            file = %result.document,
            tool = %result.tool,
            seconds = result.duration_secs(),
            kind = result.failure_kind.map(|k| k.as_str()).unwrap_or("unknown"),
            "{}: {} took {:.2}s - failed: {}",
            result.document,
            result.tool,
            result.duration_secs(),
            result.error_message.as_deref().unwrap_or("")
        );
    }
}
