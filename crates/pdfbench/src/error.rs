//! Error types for pdfbench.
//!
//! Two kinds of failure exist in a benchmark:
//!
//! - **Run errors** abort an operation and are returned as `Err(PdfBenchError)`:
//!   an empty document or tool set, an unreadable data directory, an invalid
//!   configuration, a failed export.
//! - **Row failures** are recorded inside the results table and never abort a
//!   run: a document that cannot be opened, a tool that exits non-zero or
//!   panics, a tool that exceeds its timeout. Tools still report these through
//!   `PdfBenchError`; the runner folds them into a [`FailureKind`] and a
//!   message via [`PdfBenchError::failure_kind`].
//!
//! `PdfBenchError::Io` always bubbles up unchanged.
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::FailureKind;

/// Result type alias using `PdfBenchError`.
pub type Result<T> = std::result::Result<T, PdfBenchError>;

/// Main error type for all pdfbench operations.
#[derive(Debug, Error)]
pub enum PdfBenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Render error: {message}")]
    Render {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Cannot open document {}: {message}", .path.display())]
    DocumentOpen { path: PathBuf, message: String },

    #[error("Tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("Tool '{tool}' timed out after {:.1}s", .timeout.as_secs_f64())]
    Timeout { tool: String, timeout: Duration },

    #[error("Unknown extraction tool: {0}")]
    UnknownTool(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for PdfBenchError {
    fn from(err: serde_json::Error) -> Self {
        PdfBenchError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<toml::de::Error> for PdfBenchError {
    fn from(err: toml::de::Error) -> Self {
        PdfBenchError::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<minijinja::Error> for PdfBenchError {
    fn from(err: minijinja::Error) -> Self {
        PdfBenchError::Render {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        paste::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl PdfBenchError {
    error_constructor!(validation, Validation);
    error_constructor!(config, Config);
    error_constructor!(serialization, Serialization);
    error_constructor!(render, Render);

    /// Create a tool failure for `tool`.
    pub fn tool_failed<T: Into<String>, S: Into<String>>(tool: T, message: S) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a document-open failure for `path`.
    pub fn document_open<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::DocumentOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify this error as a result-row failure.
    ///
    /// Everything that is neither a timeout nor a document-open failure counts
    /// as a tool failure: a tool that trips over an I/O error or an unexpected
    /// output format has failed on that document.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            PdfBenchError::DocumentOpen { .. } => FailureKind::DocumentOpen,
            PdfBenchError::Timeout { .. } => FailureKind::Timeout,
            _ => FailureKind::ToolFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PdfBenchError = io_err.into();
        assert!(matches!(err, PdfBenchError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_validation_error() {
        let err = PdfBenchError::validation("no documents");
        assert_eq!(err.to_string(), "Validation error: no documents");
    }

    #[test]
    fn test_config_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad toml");
        let err = PdfBenchError::config_with_source("invalid config", source);
        assert_eq!(err.to_string(), "Configuration error: invalid config");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_timeout_display() {
        let err = PdfBenchError::Timeout {
            tool: "mineru".to_string(),
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Tool 'mineru' timed out after 1.5s");
    }

    #[test]
    fn test_json_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: PdfBenchError = json_err.into();
        assert!(matches!(err, PdfBenchError::Serialization { .. }));
    }

    #[test]
    fn test_failure_kind_mapping() {
        assert_eq!(
            PdfBenchError::document_open("/tmp/a.pdf", "missing").failure_kind(),
            FailureKind::DocumentOpen
        );
        assert_eq!(
            PdfBenchError::Timeout {
                tool: "x".to_string(),
                timeout: Duration::from_secs(1),
            }
            .failure_kind(),
            FailureKind::Timeout
        );
        assert_eq!(
            PdfBenchError::tool_failed("x", "exit 1").failure_kind(),
            FailureKind::ToolFailure
        );
        assert_eq!(
            PdfBenchError::MissingDependency("mineru".to_string()).failure_kind(),
            FailureKind::ToolFailure
        );
    }
}
