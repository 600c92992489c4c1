//! API server setup and configuration.

use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::BenchmarkConfig;
use crate::registry::ToolRegistry;
use crate::{PdfBenchError, Result};

use super::{
    handlers::{health_handler, index_handler, results_csv_handler, results_handler, run_handler, tools_handler},
    types::ApiState,
};

/// Default bind address of the dashboard.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8501;

/// CORS layer from `PDFBENCH_CORS_ORIGINS` (comma-separated). Unset or empty
/// means any origin.
fn cors_layer_from_env() -> CorsLayer {
    if let Ok(origins_str) = std::env::var("PDFBENCH_CORS_ORIGINS") {
        let origins: Vec<_> = origins_str
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if !origins.is_empty() {
            tracing::info!("CORS configured with {} explicit allowed origin(s)", origins.len());
            return CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any);
        }

        tracing::warn!("PDFBENCH_CORS_ORIGINS set but empty/invalid - allowing all origins");
    }

    CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
}

/// Create the dashboard router.
///
/// This is public to allow embedding the dashboard in another application.
pub fn create_router(config: BenchmarkConfig, registry: ToolRegistry) -> Router {
    let state = ApiState::new(config, registry);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/run", post(run_handler))
        .route("/api/results", get(results_handler))
        .route("/api/results.csv", get(results_csv_handler))
        .route("/api/tools", get(tools_handler))
        .route("/health", get(health_handler))
        .layer(cors_layer_from_env())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the dashboard with config file discovery.
///
/// Searches for `pdfbench.toml` in current and parent directories, then
/// applies `PDFBENCH_*` environment overrides.
pub async fn serve(host: impl AsRef<str>, port: u16) -> Result<()> {
    let config = BenchmarkConfig::load(None)?;
    serve_with_config(host, port, config).await
}

/// Start the dashboard with an explicit config.
///
/// # Arguments
///
/// * `host` - IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// * `port` - Port number to bind to (e.g., 8501)
/// * `config` - Defaults for run requests, plus custom tools
pub async fn serve_with_config(host: impl AsRef<str>, port: u16, config: BenchmarkConfig) -> Result<()> {
    let ip: IpAddr = host
        .as_ref()
        .parse()
        .map_err(|e| PdfBenchError::validation(format!("Invalid host address: {}", e)))?;

    let addr = SocketAddr::new(ip, port);
    let registry = ToolRegistry::from_config(&config)?;
    let app = create_router(config, registry);

    tracing::info!("Starting pdfbench dashboard on http://{}:{}", ip, port);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .await
        .map_err(|e| PdfBenchError::Other(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn test_create_router() {
        let _router = create_router(BenchmarkConfig::default(), ToolRegistry::new());
    }

    #[test]
    #[serial_test::serial]
    fn test_cors_layer_with_origins() {
        unsafe {
            std::env::set_var("PDFBENCH_CORS_ORIGINS", "https://a.example.com, https://b.example.com");
        }
        let _layer = cors_layer_from_env();
        unsafe {
            std::env::remove_var("PDFBENCH_CORS_ORIGINS");
        }
    }

    #[tokio::test]
    async fn test_serve_rejects_bad_host() {
        let err = serve_with_config("not-an-ip", 0, BenchmarkConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid host address"));
    }
}
