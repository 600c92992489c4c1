//! Local HTTP dashboard.
//!
//! # Endpoints
//!
//! - `GET /` - Dashboard page: run form, charts and table of the latest run
//! - `POST /api/run` - Run a benchmark (`{"directory": "...", "tools": ["..."]}`)
//! - `GET /api/results` - Latest run as JSON
//! - `GET /api/results.csv` - Latest run as CSV
//! - `GET /api/tools` - Registered tools
//! - `GET /health` - Health check
//!
//! # cURL Examples
//!
//! ```bash
//! curl -X POST -H 'content-type: application/json' \
//!      -d '{"directory": "pdfs", "tools": ["pdftotext", "lopdf"]}' \
//!      http://localhost:8501/api/run
//!
//! curl http://localhost:8501/api/results.csv
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{DEFAULT_HOST, DEFAULT_PORT, create_router, serve, serve_with_config};
pub use types::{ApiState, ErrorResponse, HealthResponse, RunRequest, ToolInfo};
