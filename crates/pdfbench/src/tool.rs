//! The extraction tool seam.
//!
//! A tool turns one PDF into text. The runner owns timing and timeouts; a
//! tool only has to do the work and report success or failure.

use async_trait::async_trait;
use std::path::Path;

use crate::Result;
use crate::types::{Extraction, PdfDocument, ToolKind};

/// An extraction tool that can be benchmarked.
#[async_trait]
pub trait ExtractionTool: Send + Sync {
    /// Tool identifier, unique within a registry
    fn name(&self) -> &str;

    /// How the tool is invoked
    fn kind(&self) -> ToolKind;

    /// Check the tool can run at all (executable on `PATH`, model files present).
    ///
    /// Called once per run before any document is processed. A failing probe
    /// turns every row of this tool into a failed row.
    async fn setup(&self) -> Result<()> {
        Ok(())
    }

    /// Extract the text of `document`.
    ///
    /// `scratch_dir` is an empty directory owned by this invocation; tools that
    /// write their output to disk put it there. The future may be dropped at
    /// any await point when the timeout elapses.
    async fn extract(&self, document: &PdfDocument, scratch_dir: &Path) -> Result<Extraction>;
}
