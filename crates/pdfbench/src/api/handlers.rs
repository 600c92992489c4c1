//! API request handlers.

use axum::{
    Json,
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};
use std::sync::Arc;

use crate::document::discover_documents;
use crate::html::render_dashboard;
use crate::output::to_csv_string;
use crate::runner::BenchmarkRunner;
use crate::types::BenchmarkRun;
use crate::PdfBenchError;

use super::{
    error::ApiError,
    types::{ApiState, HealthResponse, RunRequest, ToolInfo},
};

/// Dashboard page.
///
/// GET /
pub async fn index_handler(State(state): State<ApiState>) -> Result<Html<String>, ApiError> {
    let latest = state.latest_run().await;
    let default_directory = state.config.data_dir.to_string_lossy().into_owned();
    let html = render_dashboard(latest.as_deref(), &state.registry.names(), &default_directory)
        .map_err(ApiError::internal)?;
    Ok(Html(html))
}

/// Run a benchmark and return the run.
///
/// POST /api/run
///
/// Only one run executes at a time; a second request waits for the first.
///
/// # Errors
///
/// Returns 400 if the directory is missing, holds no PDF files, or a tool
/// name is unknown.
pub async fn run_handler(
    State(state): State<ApiState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<BenchmarkRun>, ApiError> {
    let directory = request.directory.unwrap_or_else(|| state.config.data_dir.clone());
    let selection = match request.tools {
        Some(tools) if !tools.is_empty() => tools,
        _ => state.config.tools.clone(),
    };

    let tools = state.registry.resolve(&selection)?;

    let _guard = state.run_lock.lock().await;

    let documents = discover_documents(&directory, state.config.recursive)?;
    if documents.is_empty() {
        return Err(ApiError::validation(PdfBenchError::validation(format!(
            "No PDF files found in {}",
            directory.display()
        ))));
    }

    tracing::info!(
        "Dashboard run: {} document(s) in {}, tools {:?}",
        documents.len(),
        directory.display(),
        tools.iter().map(|t| t.name()).collect::<Vec<_>>()
    );

    let run = BenchmarkRunner::new(&state.config).run(&documents, &tools).await?;
    let run = Arc::new(run);

    *state.latest.write().await = Some(Arc::clone(&run));

    Ok(Json((*run).clone()))
}

/// Latest run as JSON.
///
/// GET /api/results
pub async fn results_handler(State(state): State<ApiState>) -> Result<Json<BenchmarkRun>, ApiError> {
    let run = state
        .latest_run()
        .await
        .ok_or_else(|| ApiError::not_found("No benchmark has been run yet"))?;
    Ok(Json((*run).clone()))
}

/// Latest run as CSV.
///
/// GET /api/results.csv
pub async fn results_csv_handler(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let run = state
        .latest_run()
        .await
        .ok_or_else(|| ApiError::not_found("No benchmark has been run yet"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"results.csv\""),
        ],
        to_csv_string(&run),
    ))
}

/// Registered tools.
///
/// GET /api/tools
pub async fn tools_handler(State(state): State<ApiState>) -> Json<Vec<ToolInfo>> {
    Json(
        state
            .registry
            .describe()
            .into_iter()
            .map(|(name, kind)| ToolInfo { name, kind })
            .collect(),
    )
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
