//! API request and response types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::config::BenchmarkConfig;
use crate::registry::ToolRegistry;
use crate::types::{BenchmarkRun, ToolKind};

/// Body of `POST /api/run`. Missing fields fall back to the server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRequest {
    /// Directory scanned for PDF files
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Tool names; empty or missing selects the configured tools
    #[serde(default)]
    pub tools: Option<Vec<String>>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status
    pub status: String,
    /// API version
    pub version: String,
}

/// One registered tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub kind: ToolKind,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type name
    pub error_type: String,
    /// Error message
    pub message: String,
    /// HTTP status code
    pub status_code: u16,
}

/// API server state.
///
/// The configuration and registry are fixed at startup. `run_lock` is held
/// for the whole of a run so that runs never overlap; `latest` holds the most
/// recent run for the session.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub config: Arc<BenchmarkConfig>,
    pub registry: Arc<ToolRegistry>,
    pub run_lock: Arc<Mutex<()>>,
    pub latest: Arc<RwLock<Option<Arc<BenchmarkRun>>>>,
}

impl ApiState {
    pub fn new(config: BenchmarkConfig, registry: ToolRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            run_lock: Arc::new(Mutex::new(())),
            latest: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn latest_run(&self) -> Option<Arc<BenchmarkRun>> {
        self.latest.read().await.clone()
    }
}
