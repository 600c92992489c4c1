//! Mapping of library errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;
use crate::PdfBenchError;

/// Error returned by API handlers, rendered as an [`ErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error_type: error_type.into(),
                message: message.into(),
                status_code: status.as_u16(),
            },
        }
    }

    /// 400 for a request the server cannot act on
    pub fn validation(error: PdfBenchError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_type_name(&error), error.to_string())
    }

    /// 404 for a missing resource
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", message)
    }

    /// 500 for everything else
    pub fn internal(error: PdfBenchError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error_type_name(&error), error.to_string())
    }
}

fn error_type_name(error: &PdfBenchError) -> &'static str {
    match error {
        PdfBenchError::Io(_) => "IoError",
        PdfBenchError::Validation { .. } => "ValidationError",
        PdfBenchError::Config { .. } => "ConfigError",
        PdfBenchError::Serialization { .. } => "SerializationError",
        PdfBenchError::Render { .. } => "RenderError",
        PdfBenchError::DocumentOpen { .. } => "DocumentOpenError",
        PdfBenchError::ToolFailed { .. } => "ToolError",
        PdfBenchError::Timeout { .. } => "TimeoutError",
        PdfBenchError::UnknownTool(_) => "UnknownToolError",
        PdfBenchError::MissingDependency(_) => "MissingDependencyError",
        PdfBenchError::Other(_) => "Error",
    }
}

impl From<PdfBenchError> for ApiError {
    fn from(error: PdfBenchError) -> Self {
        match error {
            PdfBenchError::Validation { .. } | PdfBenchError::UnknownTool(_) => Self::validation(error),
            _ => Self::internal(error),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{}: {}", self.body.error_type, self.body.message);
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = PdfBenchError::validation("No PDF files found").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error_type, "ValidationError");

        let err: ApiError = PdfBenchError::UnknownTool("nope".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.status_code, 400);

        let err: ApiError = PdfBenchError::Other("disk full".to_string()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(ApiError::not_found("No run").body.status_code, 404);
    }
}
