//! Integration tests for the dashboard API.

#![cfg(feature = "api")]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use pdfbench::{
    BenchmarkConfig, BenchmarkRun, Extraction, ExtractionTool, PdfBenchError, PdfDocument, ToolKind, ToolRegistry,
    api::{ErrorResponse, HealthResponse, ToolInfo, create_router},
};

/// Returns the document's file name as its text; fails on names containing "broken".
struct EchoTool;

#[async_trait]
impl ExtractionTool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::InProcess
    }

    async fn extract(&self, document: &PdfDocument, _scratch_dir: &Path) -> pdfbench::Result<Extraction> {
        if document.name.contains("broken") {
            return Err(PdfBenchError::tool_failed("echo", "cannot read broken file"));
        }
        Ok(Extraction::new(document.name.clone()))
    }
}

fn app(data_dir: &Path) -> Router {
    let config = BenchmarkConfig {
        data_dir: data_dir.to_path_buf(),
        timeout_secs: 10,
        ..Default::default()
    };
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(EchoTool)).unwrap();
    create_router(config, registry)
}

fn pdf_dir(names: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in names {
        std::fs::write(dir.path().join(name), b"%PDF-1.4\n%test\n").unwrap();
    }
    dir
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_run(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/run")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = pdf_dir(&[]);
    let response = app(dir.path()).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_tools_endpoint() {
    let dir = pdf_dir(&[]);
    let response = app(dir.path()).oneshot(get("/api/tools")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tools: Vec<ToolInfo> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(
        tools,
        vec![ToolInfo {
            name: "echo".to_string(),
            kind: ToolKind::InProcess
        }]
    );
}

#[tokio::test]
async fn test_results_not_found_before_run() {
    let dir = pdf_dir(&[]);
    let app = app(dir.path());

    let response = app.clone().oneshot(get("/api/results")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(error.status_code, 404);

    let response = app.oneshot(get("/api/results.csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_page_renders() {
    let dir = pdf_dir(&[]);
    let response = app(dir.path()).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("No benchmark results yet"));
    assert!(html.contains("value=\"echo\""));
}

#[tokio::test]
async fn test_run_with_unknown_tool_is_bad_request() {
    let dir = pdf_dir(&["a.pdf"]);
    let response = app(dir.path())
        .oneshot(post_run(json!({ "tools": ["missing-tool"] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(error.error_type, "UnknownToolError");
    assert!(error.message.contains("missing-tool"));
}

#[tokio::test]
async fn test_run_without_pdfs_is_bad_request() {
    let dir = pdf_dir(&[]);
    let response = app(dir.path()).oneshot(post_run(json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(error.message.contains("No PDF files found"));
}

#[tokio::test]
async fn test_run_with_missing_directory_is_bad_request() {
    let dir = pdf_dir(&[]);
    let missing = dir.path().join("nowhere");
    let response = app(dir.path())
        .oneshot(post_run(json!({ "directory": missing })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_run_then_fetch_results() {
    let dir = pdf_dir(&["a.pdf", "broken.pdf"]);
    let app = app(dir.path());

    let response = app
        .clone()
        .oneshot(post_run(json!({ "directory": dir.path(), "tools": ["echo"] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let run: BenchmarkRun = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(run.len(), 2);
    assert_eq!(run.find("a.pdf", "echo").map(|r| r.char_count), Some(5));
    assert!(!run.find("broken.pdf", "echo").unwrap().success);

    let response = app.clone().oneshot(get("/api/results")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let latest: BenchmarkRun = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(latest, run);

    let response = app.clone().oneshot(get("/api/results.csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/csv; charset=utf-8"
    );
    let csv = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(csv.starts_with("file,tool,success,time_seconds,size_mb,char_count,failure_kind,error\n"));
    assert!(csv.contains("broken.pdf,echo,false"));

    let response = app.oneshot(get("/")).await.unwrap();
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(!html.contains("No benchmark results yet"));
    assert!(html.contains("successChart"));
}
