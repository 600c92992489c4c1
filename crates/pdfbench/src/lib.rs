//! pdfbench - benchmark PDF-to-text extraction tools
//!
//! Runs a set of extraction tools (external programs such as MinerU, Marker or
//! `pdftotext`, and in-process Rust libraries) over a folder of PDF files,
//! records wall-clock time, character count and success for every
//! (document, tool) pair, and renders the table as JSON, CSV, an HTML report
//! or a local dashboard.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pdfbench::{BenchmarkConfig, BenchmarkRunner, ToolRegistry, discover_documents};
//!
//! # async fn example() -> pdfbench::Result<()> {
//! let config = BenchmarkConfig::load(None)?;
//! let registry = ToolRegistry::from_config(&config)?;
//! let documents = discover_documents(&config.data_dir, config.recursive)?;
//! let tools = registry.resolve(&config.tools)?;
//!
//! let run = BenchmarkRunner::new(&config).run(&documents, &tools).await?;
//! println!("{}/{} extractions succeeded", run.successful().count(), run.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `native` (default): in-process `lopdf` and `pdf-extract` tools
//! - `api` (default): axum dashboard, see [`api`]

#![deny(unsafe_code)]

pub mod config;
pub mod document;
pub mod error;
pub mod html;
pub mod output;
pub mod registry;
pub mod runner;
pub mod stats;
pub mod tool;
pub mod tools;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

pub use config::{BenchmarkConfig, CommandToolConfig, OutputCapture};
pub use document::{check_readable, discover_documents, is_pdf_path};
pub use error::{PdfBenchError, Result};
pub use html::{render_dashboard, render_report, write_html};
pub use output::{ExportFormat, to_csv_string, write_csv, write_json, write_report};
pub use registry::ToolRegistry;
pub use runner::{BenchmarkRunner, Progress};
pub use stats::{DurationStatistics, RunSummary, ToolSummary};
pub use tool::ExtractionTool;
pub use tools::CommandTool;
pub use types::{BenchmarkResult, BenchmarkRun, Extraction, FailureKind, PdfDocument, ToolKind};
