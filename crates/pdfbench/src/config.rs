//! Benchmark configuration.
//!
//! Configuration is layered, lowest precedence first:
//!
//! 1. Built-in defaults ([`BenchmarkConfig::default`])
//! 2. `pdfbench.toml`, given explicitly or discovered in the current or a parent directory
//! 3. Environment variables (`PDFBENCH_*`, see [`BenchmarkConfig::apply_env_overrides`])
//! 4. Command-line flags (applied by the CLI)
//!
//! ```toml
//! data_dir = "pdfs"
//! output_dir = "benchmark_results"
//! timeout_secs = 300
//! tools = ["mineru", "pdftotext", "lopdf"]
//!
//! [[custom_tools]]
//! name = "docling"
//! command = "docling"
//! args = ["{input}", "--to", "md", "--output", "{output_dir}"]
//! capture = { file = { extension = "md" } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PdfBenchError, Result};

/// Name of the configuration file searched by [`BenchmarkConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "pdfbench.toml";

/// Default per-invocation timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Where a command tool leaves its extracted text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputCapture {
    /// Text is written to standard output
    #[default]
    Stdout,
    /// Text is written to a file under the scratch directory; the first file
    /// (sorted by path) with this extension is read
    File { extension: String },
}

/// A user-defined subprocess extraction tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandToolConfig {
    /// Tool identifier used in results and tool selection
    pub name: String,

    /// Executable name or path
    pub command: String,

    /// Argument template. `{input}`, `{output_dir}` and `{stem}` are substituted.
    #[serde(default)]
    pub args: Vec<String>,

    /// Output capture mode
    #[serde(default)]
    pub capture: OutputCapture,

    /// Extra environment variables for the child process
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Configuration for benchmark runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Directory scanned for PDF files
    pub data_dir: PathBuf,

    /// Directory for exported results
    pub output_dir: PathBuf,

    /// Keep raw tool outputs under this directory instead of a temporary one
    pub artifacts_dir: Option<PathBuf>,

    /// Timeout for each extraction, in seconds
    pub timeout_secs: u64,

    /// Enabled tools (empty = every registered tool)
    pub tools: Vec<String>,

    /// Whether discovery descends into subdirectories
    pub recursive: bool,

    /// Additional subprocess tools
    pub custom_tools: Vec<CommandToolConfig>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            output_dir: PathBuf::from("benchmark_results"),
            artifacts_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tools: Vec::new(),
            recursive: true,
            custom_tools: Vec::new(),
        }
    }
}

impl BenchmarkConfig {
    /// Per-invocation timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `PdfBenchError::Config` if the file cannot be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PdfBenchError::config_with_source(format!("Failed to read config file {}", path.display()), e)
        })?;

        toml::from_str(&content)
            .map_err(|e| PdfBenchError::config_with_source(format!("Invalid TOML in {}", path.display()), e))
    }

    /// Discover `pdfbench.toml` in the current directory or its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir()?;
        Self::discover_from(&current)
    }

    /// Same as [`discover`](Self::discover), starting at `start`.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        let mut current = Some(start);

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!("Using config file {}", candidate.display());
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load from an explicit path, or discover, or fall back to defaults;
    /// then apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::discover()?.unwrap_or_default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PDFBENCH_*` environment variables.
    ///
    /// - `PDFBENCH_DATA_DIR` - directory scanned for PDFs
    /// - `PDFBENCH_OUTPUT_DIR` - export directory
    /// - `PDFBENCH_ARTIFACTS_DIR` - keep raw tool outputs here
    /// - `PDFBENCH_TOOLS` - comma-separated tool names
    /// - `PDFBENCH_TIMEOUT_SECS` - per-invocation timeout
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("PDFBENCH_DATA_DIR")
            && !dir.trim().is_empty()
        {
            self.data_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("PDFBENCH_OUTPUT_DIR")
            && !dir.trim().is_empty()
        {
            self.output_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("PDFBENCH_ARTIFACTS_DIR")
            && !dir.trim().is_empty()
        {
            self.artifacts_dir = Some(PathBuf::from(dir));
        }

        if let Ok(tools) = std::env::var("PDFBENCH_TOOLS") {
            self.tools = parse_tool_list(&tools);
        }

        if let Ok(value) = std::env::var("PDFBENCH_TIMEOUT_SECS") {
            self.timeout_secs = value.trim().parse::<u64>().map_err(|e| {
                PdfBenchError::config_with_source(format!("PDFBENCH_TIMEOUT_SECS='{}' is not a valid integer", value), e)
            })?;
        }

        Ok(())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`PdfBenchError::Config`] if any configuration value is invalid
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(PdfBenchError::config("timeout_secs must be > 0"));
        }

        if self.tools.iter().any(|t| t.trim().is_empty()) {
            return Err(PdfBenchError::config("tool names cannot be empty"));
        }

        let mut seen = HashSet::new();
        for tool in &self.custom_tools {
            if tool.name.trim().is_empty() {
                return Err(PdfBenchError::config("custom tool name cannot be empty"));
            }
            if tool.command.trim().is_empty() {
                return Err(PdfBenchError::config(format!(
                    "custom tool '{}' has an empty command",
                    tool.name
                )));
            }
            if let OutputCapture::File { extension } = &tool.capture
                && extension.trim_start_matches('.').is_empty()
            {
                return Err(PdfBenchError::config(format!(
                    "custom tool '{}' captures a file but has no extension",
                    tool.name
                )));
            }
            if !seen.insert(tool.name.as_str()) {
                return Err(PdfBenchError::config(format!("duplicate custom tool '{}'", tool.name)));
            }
        }

        Ok(())
    }
}

/// Split a comma-separated tool list, dropping blanks.
pub fn parse_tool_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    fn clear_env() {
        unsafe {
            for key in [
                "PDFBENCH_DATA_DIR",
                "PDFBENCH_OUTPUT_DIR",
                "PDFBENCH_ARTIFACTS_DIR",
                "PDFBENCH_TOOLS",
                "PDFBENCH_TIMEOUT_SECS",
            ] {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert!(config.recursive);
        assert!(config.tools.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        fs::write(
            &config_path,
            r#"
data_dir = "pdfs"
timeout_secs = 60
tools = ["pdftotext", "docling"]
recursive = false

[[custom_tools]]
name = "docling"
command = "docling"
args = ["{input}", "--output", "{output_dir}"]
capture = { file = { extension = "md" } }

[custom_tools.env]
OMP_NUM_THREADS = "1"
        "#,
        )
        .unwrap();

        let config = BenchmarkConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("pdfs"));
        assert_eq!(config.timeout_secs, 60);
        assert!(!config.recursive);
        assert_eq!(config.tools, vec!["pdftotext", "docling"]);
        assert_eq!(config.output_dir, PathBuf::from("benchmark_results"));

        let docling = &config.custom_tools[0];
        assert_eq!(docling.command, "docling");
        assert_eq!(
            docling.capture,
            OutputCapture::File {
                extension: "md".to_string()
            }
        );
        assert_eq!(docling.env.get("OMP_NUM_THREADS").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "timeout_secs = \"soon\"").unwrap();

        let err = BenchmarkConfig::from_toml_file(&config_path).unwrap_err();
        assert!(matches!(err, PdfBenchError::Config { .. }));
    }

    #[test]
    fn test_discover_from_parent_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "timeout_secs = 42\n").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = BenchmarkConfig::discover_from(&nested).unwrap().unwrap();
        assert_eq!(config.timeout_secs, 42);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("PDFBENCH_DATA_DIR", "/srv/pdfs");
            std::env::set_var("PDFBENCH_TOOLS", "mineru, lopdf,,");
            std::env::set_var("PDFBENCH_TIMEOUT_SECS", "12");
        }

        let mut config = BenchmarkConfig::default();
        config.apply_env_overrides().unwrap();
        clear_env();

        assert_eq!(config.data_dir, PathBuf::from("/srv/pdfs"));
        assert_eq!(config.tools, vec!["mineru", "lopdf"]);
        assert_eq!(config.timeout_secs, 12);
    }

    #[test]
    #[serial]
    fn test_env_override_invalid_timeout() {
        clear_env();
        unsafe {
            std::env::set_var("PDFBENCH_TIMEOUT_SECS", "forever");
        }

        let mut config = BenchmarkConfig::default();
        let result = config.apply_env_overrides();
        clear_env();

        assert!(result.unwrap_err().to_string().contains("PDFBENCH_TIMEOUT_SECS"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = BenchmarkConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_custom_tools() {
        let tool = CommandToolConfig {
            name: "dup".to_string(),
            command: "cat".to_string(),
            args: vec![],
            capture: OutputCapture::Stdout,
            env: HashMap::new(),
        };
        let config = BenchmarkConfig {
            custom_tools: vec![tool.clone(), tool],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate custom tool 'dup'"));
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let config = BenchmarkConfig {
            custom_tools: vec![CommandToolConfig {
                name: "blank".to_string(),
                command: "  ".to_string(),
                args: vec![],
                capture: OutputCapture::Stdout,
                env: HashMap::new(),
            }],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_tool_list() {
        assert_eq!(parse_tool_list(" a ,b,, c"), vec!["a", "b", "c"]);
        assert!(parse_tool_list("").is_empty());
    }
}
