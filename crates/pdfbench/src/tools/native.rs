//! In-process extraction tools built on pure-Rust PDF libraries.
//!
//! Both libraries are synchronous and can panic on malformed input, so every
//! call runs on the blocking pool and a panic surfaces as a tool failure.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::tool::ExtractionTool;
use crate::types::{Extraction, PdfDocument, ToolKind};
use crate::{PdfBenchError, Result};

/// Run `f` on the blocking pool, mapping a panic to a failure of `tool`.
async fn run_blocking<F>(tool: &str, f: F) -> Result<String>
where
    F: FnOnce() -> std::result::Result<String, String> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(message)) => Err(PdfBenchError::tool_failed(tool, message)),
        Err(e) if e.is_panic() => Err(PdfBenchError::tool_failed(tool, "library panicked while parsing the document")),
        Err(e) => Err(PdfBenchError::tool_failed(tool, format!("extraction task failed: {}", e))),
    }
}

/// Page-wise text extraction with `lopdf`.
#[derive(Debug, Clone, Default)]
pub struct LopdfTool;

impl LopdfTool {
    pub const NAME: &'static str = "lopdf";

    pub fn new() -> Self {
        Self
    }
}

fn lopdf_extract(path: PathBuf) -> std::result::Result<String, String> {
    let document = lopdf::Document::load(&path).map_err(|e| format!("failed to load PDF: {}", e))?;
    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();

    if page_numbers.is_empty() {
        return Ok(String::new());
    }

    document
        .extract_text(&page_numbers)
        .map_err(|e| format!("failed to extract text: {}", e))
}

#[async_trait]
impl ExtractionTool for LopdfTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> ToolKind {
        ToolKind::InProcess
    }

    async fn extract(&self, document: &PdfDocument, _scratch_dir: &Path) -> Result<Extraction> {
        let path = document.path.clone();
        let text = run_blocking(Self::NAME, move || lopdf_extract(path)).await?;
        Ok(Extraction::new(text))
    }
}

/// Whole-document text extraction with `pdf-extract`.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractTool;

impl PdfExtractTool {
    pub const NAME: &'static str = "pdf-extract";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExtractionTool for PdfExtractTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> ToolKind {
        ToolKind::InProcess
    }

    async fn extract(&self, document: &PdfDocument, _scratch_dir: &Path) -> Result<Extraction> {
        let path = document.path.clone();
        let text = run_blocking(Self::NAME, move || {
            pdf_extract::extract_text(&path).map_err(|e| format!("pdf-extract error: {}", e))
        })
        .await?;
        Ok(Extraction::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// One page showing `text` in Courier.
    fn single_page_pdf(dir: &Path, text: &str) -> PdfDocument {
        use lopdf::content::{Content, Operation};
        use lopdf::{Document, Object, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let path = dir.join("hello.pdf");
        doc.save(&path).unwrap();
        PdfDocument::from_path(path)
    }

    fn broken_pdf(dir: &Path) -> PdfDocument {
        let path = dir.join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\nthis is not really a pdf\n").unwrap();
        PdfDocument::from_path(path)
    }

    #[test]
    fn test_names_and_kinds() {
        assert_eq!(LopdfTool::new().name(), "lopdf");
        assert_eq!(PdfExtractTool::new().name(), "pdf-extract");
        assert_eq!(LopdfTool::new().kind(), ToolKind::InProcess);
        assert_eq!(PdfExtractTool::new().kind(), ToolKind::InProcess);
    }

    #[tokio::test]
    async fn test_lopdf_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let document = broken_pdf(tmp.path());

        let err = LopdfTool::new().extract(&document, tmp.path()).await.unwrap_err();
        assert!(matches!(err, PdfBenchError::ToolFailed { ref tool, .. } if tool == "lopdf"));
    }

    #[tokio::test]
    async fn test_pdf_extract_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let document = broken_pdf(tmp.path());

        let err = PdfExtractTool::new().extract(&document, tmp.path()).await.unwrap_err();
        assert!(matches!(err, PdfBenchError::ToolFailed { ref tool, .. } if tool == "pdf-extract"));
    }

    #[tokio::test]
    async fn test_lopdf_extracts_page_text() {
        let tmp = TempDir::new().unwrap();
        let document = single_page_pdf(tmp.path(), "pdfbench");

        let extraction = LopdfTool::new().extract(&document, tmp.path()).await.unwrap();
        assert!(extraction.text.contains("pdfbench"), "got {:?}", extraction.text);
        assert!(extraction.char_count() >= "pdfbench".len());
    }

    #[tokio::test]
    async fn test_pdf_extract_extracts_page_text() {
        let tmp = TempDir::new().unwrap();
        let document = single_page_pdf(tmp.path(), "pdfbench");

        let extraction = PdfExtractTool::new().extract(&document, tmp.path()).await.unwrap();
        assert!(extraction.text.contains("pdfbench"), "got {:?}", extraction.text);
        assert!(extraction.char_count() >= "pdfbench".len());
    }

    #[tokio::test]
    async fn test_run_blocking_maps_panic() {
        let err = run_blocking("boom", || panic!("parser exploded")).await.unwrap_err();
        assert!(err.to_string().contains("panicked"));
    }
}
