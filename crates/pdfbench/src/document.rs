//! PDF document discovery and the pre-flight open check.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{PdfBenchError, Result};
use crate::types::PdfDocument;

/// The `%PDF-` signature must appear within this many leading bytes.
const SIGNATURE_WINDOW: usize = 1024;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Whether `path` has a `.pdf` extension (case-insensitive).
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Find every PDF file under `dir`, sorted by path.
///
/// Returned paths are absolute, so tools may run in any working directory.
///
/// # Errors
///
/// Returns `PdfBenchError::Validation` if `dir` does not exist or is not a
/// directory, and `PdfBenchError::Io` if a directory cannot be listed.
pub fn discover_documents(dir: impl AsRef<Path>, recursive: bool) -> Result<Vec<PdfDocument>> {
    let dir = dir.as_ref();

    if !dir.exists() {
        return Err(PdfBenchError::validation(format!(
            "Data directory does not exist: {}",
            dir.display()
        )));
    }
    if !dir.is_dir() {
        return Err(PdfBenchError::validation(format!(
            "Data path is not a directory: {}",
            dir.display()
        )));
    }

    let root = std::path::absolute(dir)?;
    let mut paths = Vec::new();
    collect_pdf_paths(&root, recursive, &mut paths)?;
    paths.sort();

    tracing::debug!("Discovered {} PDF file(s) in {}", paths.len(), dir.display());

    Ok(paths.into_iter().map(PdfDocument::from_path).collect())
}

fn collect_pdf_paths(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
            if recursive {
                collect_pdf_paths(&path, recursive, out)?;
            }
        } else if is_pdf_path(&path) {
            out.push(path);
        }
    }

    Ok(())
}

/// Check that a document can be opened and looks like a PDF.
///
/// The file must be readable and contain the `%PDF-` signature within its
/// first 1024 bytes. This is deliberately shallow: whether the rest of the
/// file parses is for each tool to find out.
pub fn check_readable(document: &PdfDocument) -> Result<()> {
    let mut file = File::open(&document.path)
        .map_err(|e| PdfBenchError::document_open(&document.path, e.to_string()))?;

    if file
        .metadata()
        .map_err(|e| PdfBenchError::document_open(&document.path, e.to_string()))?
        .is_dir()
    {
        return Err(PdfBenchError::document_open(&document.path, "path is a directory"));
    }

    let mut head = Vec::with_capacity(SIGNATURE_WINDOW);
    file.by_ref()
        .take(SIGNATURE_WINDOW as u64)
        .read_to_end(&mut head)
        .map_err(|e| PdfBenchError::document_open(&document.path, e.to_string()))?;

    if head.is_empty() {
        return Err(PdfBenchError::document_open(&document.path, "file is empty"));
    }

    if !head.windows(PDF_SIGNATURE.len()).any(|w| w == PDF_SIGNATURE) {
        return Err(PdfBenchError::document_open(
            &document.path,
            "missing %PDF- signature",
        ));
    }

    Ok(())
}
